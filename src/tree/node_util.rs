/// Tags whose content never contributes to converted output
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "iframe", "object",
    "embed", "svg", "canvas", "button", "input", "select", "textarea",
];

/// Tags that start a new block in every target format
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "dialog", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul", "#document",
    "madcap:dropdown", "madcap:dropdownhead", "madcap:dropdownbody", "madcap:snippetblock",
];

/// Check whether a tag renders as a block element.
#[inline]
#[must_use]
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Check whether a tag is dropped from output entirely.
#[inline]
#[must_use]
pub fn is_skipped_tag(tag: &str) -> bool {
    SKIPPED_TAGS.contains(&tag)
}

/// Look up a declaration in an inline `style` attribute.
///
/// Property names compare case-insensitively; the returned value is trimmed
/// and keeps its original case.
#[must_use]
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(property) {
            let value = value.trim().trim_end_matches("!important").trim();
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

/// Parse a CSS or attribute length in pixels (`16`, `16px`, `16.5px`).
///
/// Relative units (`%`, `em`, `rem`) are not pixels and yield `None`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value
        .strip_suffix("px")
        .or_else(|| value.strip_suffix("PX"))
        .unwrap_or(value)
        .trim();
    number.parse::<f32>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_property_lookup() {
        let style = "color: red; Width: 16px ; text-align:center !important";
        assert_eq!(style_property(style, "width"), Some("16px"));
        assert_eq!(style_property(style, "text-align"), Some("center"));
        assert_eq!(style_property(style, "height"), None);
    }

    #[test]
    fn test_parse_px_units() {
        assert_eq!(parse_px("16"), Some(16.0));
        assert_eq!(parse_px(" 32px "), Some(32.0));
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("2em"), None);
    }

    #[test]
    fn test_block_and_skipped_tags() {
        assert!(is_block_tag("p"));
        assert!(!is_block_tag("span"));
        assert!(is_skipped_tag("script"));
        assert!(!is_skipped_tag("p"));
    }
}
