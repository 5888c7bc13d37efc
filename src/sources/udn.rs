use crate::domain::Platform;
use crate::sources::{utk, SourceConfig};

const BASE: &str = "https://tickets.udnfunlife.com/";

pub fn source() -> SourceConfig {
    utk::source(
        Platform::Udn,
        BASE,
        &[
            ("展覽/博覽", "https://tickets.udnfunlife.com/application/UTK01/UTK0101_03.aspx?Category=231"),
            ("音樂會/演唱會", "https://tickets.udnfunlife.com/application/UTK01/UTK0101_03.aspx?Category=77"),
            ("戲劇表演", "https://tickets.udnfunlife.com/application/UTK01/UTK0101_03.aspx?Category=116"),
        ],
    )
}
