use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The ticketing platforms with a built-in adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Opentix,
    Kham,
    Udn,
    Ibon,
    Kktix,
    Tixcraft,
    Era,
    Eventgo,
}

impl Platform {
    /// Default adapter execution order.
    pub const ALL: [Platform; 8] = [
        Platform::Opentix,
        Platform::Kham,
        Platform::Udn,
        Platform::Ibon,
        Platform::Kktix,
        Platform::Tixcraft,
        Platform::Era,
        Platform::Eventgo,
    ];

    /// Stable ASCII key used in config files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Opentix => "opentix",
            Platform::Kham => "kham",
            Platform::Udn => "udn",
            Platform::Ibon => "ibon",
            Platform::Kktix => "kktix",
            Platform::Tixcraft => "tixcraft",
            Platform::Era => "era",
            Platform::Eventgo => "eventgo",
        }
    }

    /// Display label written to the `platform` column.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Opentix => "OPENTIX",
            Platform::Kham => "寬宏",
            Platform::Udn => "UDN",
            Platform::Ibon => "iBon",
            Platform::Kktix => "KKTIX",
            Platform::Tixcraft => "拓元",
            Platform::Era => "年代",
            Platform::Eventgo => "Event GO",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Accepts either the ASCII key or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(needle) || p.label() == needle)
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}
