//! 年代售票 (ticket.com.tw)

use crate::domain::Platform;
use crate::sources::{utk, SourceConfig};

const BASE: &str = "https://www.ticket.com.tw/";

pub fn source() -> SourceConfig {
    utk::source(
        Platform::Era,
        BASE,
        &[
            ("音樂會/演唱會", "https://www.ticket.com.tw/application/UTK01/UTK0101_.aspx?CATEGORY=1"),
            ("展覽/博覽", "https://www.ticket.com.tw/application/UTK01/UTK0101_.aspx?CATEGORY=3"),
            ("戲劇表演", "https://www.ticket.com.tw/application/UTK01/UTK0101_.aspx?CATEGORY=2"),
            ("親子活動", "https://www.ticket.com.tw/application/UTK01/UTK0101_.aspx?CATEGORY=4"),
        ],
    )
}
