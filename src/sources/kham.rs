use crate::domain::Platform;
use crate::sources::{utk, SourceConfig};

const BASE: &str = "https://kham.com.tw/";

pub fn source() -> SourceConfig {
    utk::source(
        Platform::Kham,
        BASE,
        &[
            ("音樂會/演唱會", "https://kham.com.tw/application/UTK01/UTK0101_06.aspx?TYPE=1&CATEGORY=205"),
            ("展覽/博覽", "https://kham.com.tw/application/UTK01/UTK0101_06.aspx?TYPE=1&CATEGORY=231"),
            ("戲劇表演", "https://kham.com.tw/application/UTK01/UTK0101_06.aspx?TYPE=1&CATEGORY=116"),
            ("親子活動", "https://kham.com.tw/application/UTK01/UTK0101_06.aspx?TYPE=1&CATEGORY=129"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let source = source();
        assert_eq!(source.pages.len(), 4);
        assert_eq!(source.pages[0].category.as_deref(), Some("音樂會/演唱會"));
    }

    #[test]
    fn test_parses_product_list() {
        utk::assert_parses_fixture(source(), "https://kham.com.tw");
    }
}
