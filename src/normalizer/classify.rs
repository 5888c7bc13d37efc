//! Keyword classification of event titles.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::OTHER_EVENT_TYPE;

/// Keyword groups, checked in order. The first group with a hit wins, so
/// "音樂劇" lands in theatre before the concert group sees "音樂".
static GROUPS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "theatre",
            r"(?i)戲劇|劇場|劇團|舞台劇|音樂劇|歌劇|舞劇|舞蹈|相聲|戲曲|京劇|歌仔戲|偶戲|\b(?:musical|theatre|theater|drama|opera|ballet|dance)\b",
        ),
        (
            "concert",
            r"(?i)演唱會|音樂會|音樂節|獨奏|交響|管弦|合唱|巡迴|\b(?:live|concert|tour|recital|symphony|jazz|orchestra)\b",
        ),
        (
            "exhibition",
            r"(?i)展覽|特展|博覽會|藝術展|畫展|\b(?:expo|exhibition|gallery)\b",
        ),
        (
            "family",
            r"(?i)親子|兒童|童話|家庭|寶寶|\b(?:kids|family|children)\b",
        ),
        (
            "sports",
            r"(?i)比賽|球賽|籃球|棒球|足球|排球|馬拉松|路跑|運動會|\b(?:marathon|sports|league)\b",
        ),
        (
            "talk",
            r"(?i)講座|論壇|座談|研討會|工作坊|分享會|講堂|\b(?:talk|forum|seminar|workshop|conference|summit)\b",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid keyword pattern")))
    .collect()
});

/// Coarse event type for a title, or [`OTHER_EVENT_TYPE`].
pub fn classify(title: &str) -> &'static str {
    GROUPS
        .iter()
        .find(|(_, re)| re.is_match(title))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_EVENT_TYPE)
}
