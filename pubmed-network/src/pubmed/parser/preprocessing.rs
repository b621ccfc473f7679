//! XML cleaning applied before any deserialization

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Strip inline formatting tags (`<i>`, `<sup>`, `<sub>`, ...) from EFetch XML
///
/// These appear inside `ArticleTitle` and `AbstractText` and break the serde
/// mapping of otherwise plain text elements.
///
/// ```ignore
/// let cleaned = strip_inline_html_tags("<AbstractText>CO<sup>2</sup> levels</AbstractText>");
/// assert_eq!(cleaned, "<AbstractText>CO2 levels</AbstractText>");
/// ```
pub(crate) fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold|mml:[a-z]+)(?:\s[^>]*)?/?>")
            .expect("inline tag pattern is valid")
    });

    let cleaned = re.replace_all(xml, "");

    if cleaned.len() != xml.len() {
        debug!(
            removed_bytes = xml.len() - cleaned.len(),
            "Stripped inline formatting tags"
        );
    }

    cleaned.into_owned()
}

/// First four-digit run in a free-form date such as `MedlineDate`
pub(crate) fn first_year_in(text: &str) -> Option<i32> {
    static YEAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = YEAR_REGEX.get_or_init(|| Regex::new(r"\d{4}").expect("year pattern is valid"));
    re.find(text).and_then(|m| m.as_str().parse().ok())
}
