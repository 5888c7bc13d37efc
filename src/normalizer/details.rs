//! Best-effort venue and date extraction from title text.

use once_cell::sync::Lazy;
use regex::Regex;

static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "... @ 華山1914文創園區"
        r"[@＠]\s*(?P<v>[^@＠|｜]+)",
        // named venues
        r"(?P<v>[\p{Han}A-Za-z0-9]{0,6}(?:國家音樂廳|國家戲劇院|音樂廳|演奏廳|戲劇院|藝術中心|文化中心|展覽館|展演中心|體育館|小巨蛋|巨蛋|Legacy|Zepp\s?\w*))",
        // "台北場", "高雄站"
        r"(?P<v>(?:台北|臺北|新北|桃園|新竹|台中|臺中|台南|臺南|高雄|基隆|嘉義|屏東|宜蘭|花蓮|台東|臺東|澎湖|金門)(?:場|站))",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid location pattern"))
    .collect()
});

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?P<v>\d{4}\s*[/.\-年]\s*\d{1,2}\s*[/.\-月]\s*\d{1,2}\s*日?)",
        r"(?P<v>\d{1,2}\s*月\s*\d{1,2}\s*日)",
        r"(?P<v>\b\d{1,2}/\d{1,2}\b)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid date pattern"))
    .collect()
});

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("v"))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

pub fn extract_location(title: &str) -> Option<String> {
    first_capture(&LOCATION_PATTERNS, title)
}

pub fn extract_date(title: &str) -> Option<String> {
    first_capture(&DATE_PATTERNS, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_after_at_sign() {
        assert_eq!(
            extract_location("莫內光影特展 @ 中正紀念堂").as_deref(),
            Some("中正紀念堂")
        );
    }

    #[test]
    fn test_location_named_venue() {
        assert_eq!(
            extract_location("李宗盛 台北小巨蛋演唱會").as_deref(),
            Some("台北小巨蛋")
        );
        assert_eq!(
            extract_location("管風琴之夜 國家音樂廳").as_deref(),
            Some("國家音樂廳")
        );
    }

    #[test]
    fn test_location_city_stop() {
        assert_eq!(extract_location("秋季巡迴 台北場").as_deref(), Some("台北場"));
    }

    #[test]
    fn test_location_none() {
        assert_eq!(extract_location("NSO 國家交響樂團 2026 樂季開幕"), None);
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            extract_date("跨年晚會 2026/12/31").as_deref(),
            Some("2026/12/31")
        );
        assert_eq!(
            extract_date("2026年1月1日 新年音樂會").as_deref(),
            Some("2026年1月1日")
        );
        assert_eq!(extract_date("聖誕特別場 12月24日").as_deref(), Some("12月24日"));
        assert_eq!(extract_date("快閃 5/20 限定").as_deref(), Some("5/20"));
    }

    #[test]
    fn test_date_none() {
        assert_eq!(extract_date("NSO 國家交響樂團 2026 樂季開幕"), None);
    }
}
