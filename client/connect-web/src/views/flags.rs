use pin_placement::CountryCode;

pub const DEFAULT_FLAG_CDN: &str = "https://flagcdn.com";

/// 48x36 flag image for `code`.
pub fn flag_url(cdn: &str, code: &CountryCode) -> String {
    format!("{}/48x36/{}.png", cdn.trim_end_matches('/'), code.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_url() {
        let code = CountryCode::parse("JP").unwrap();
        assert_eq!(
            flag_url(DEFAULT_FLAG_CDN, &code),
            "https://flagcdn.com/48x36/jp.png"
        );
        assert_eq!(
            flag_url("http://cdn.local/", &code),
            "http://cdn.local/48x36/jp.png"
        );
    }
}
