use scraper::Html;

/// Decodes HTML entities the page left encoded in text or attribute values,
/// e.g. `R&amp;D` as rendered by some listing templates.
pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.trim().to_string();
    }
    let fragment = Html::parse_fragment(raw);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Quotes a value for use inside a single-quoted CSS attribute selector.
pub(crate) fn css_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_encoded_ampersand() {
        assert_eq!(decode_entities("R&amp;D"), "R&D");
        assert_eq!(decode_entities(" R&D "), "R&D");
        assert_eq!(decode_entities("Sales"), "Sales");
    }

    #[test]
    fn decoded_match_stays_case_sensitive() {
        assert_ne!(decode_entities("r&amp;d"), "R&D");
    }

    #[test]
    fn quotes_selector_values() {
        assert_eq!(css_quote("R&D"), "R&D");
        assert_eq!(css_quote("Ops 'EU'"), "Ops \\'EU\\'");
    }
}
