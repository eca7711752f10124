//! Image placement and path/link rewriting
//!
//! - [`classify_image`] decides whether an image renders inline or as its own
//!   block
//! - [`normalize_image_path`] maps authoring-tool folder layouts onto a single
//!   `images/` root
//! - [`rewrite_link`] retargets cross-document links to the output extension

use regex::Regex;
use std::sync::LazyLock;

use crate::config::TargetFormat;
use crate::tree::{Document, NodeId, is_block_tag, parse_px, style_property};

/// Where an image is placed in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePlacement {
    Inline,
    Block,
}

/// Largest width and height, in pixels, still treated as an icon
const ICON_MAX_PX: f32 = 32.0;

/// Class tokens authors use to mark small inline images
const ICON_CLASSES: &[&str] = &[
    "icon",
    "small-icon",
    "inline-icon",
    "inline-image",
    "inline",
    "emoji",
    "glyph",
];

/// File names following common UI-icon conventions
static ICON_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[_\-.])(icon|icons|ico|btn|button|bullet|arrow|glyph|emoji|checkmark)([_\-.0-9]|$)",
    )
    .expect("ICON_FILE: hardcoded regex is valid")
});

/// Folder layouts whose contents are consolidated under `images/`,
/// longest first
const IMAGE_FOLDERS: &[&[&str]] = &[
    &["resources", "images"],
    &["resources", "multimedia"],
    &["images"],
    &["image"],
    &["img"],
    &["multimedia"],
    &["media"],
];

/// Authoring-tool project roots stripped from relative paths
const PROJECT_ROOTS: &[&str] = &["content", "project"];

/// Classify an `<img>` as inline or block.
///
/// Checks, in order: icon class, explicit size no larger than 32px in both
/// dimensions, icon-like file name, a table-cell host, other meaningful text
/// in the nearest block ancestor. Anything left is a block image.
#[must_use]
pub fn classify_image(doc: &Document, id: NodeId) -> ImagePlacement {
    if ICON_CLASSES.iter().any(|class| doc.has_class(id, class)) {
        return ImagePlacement::Inline;
    }

    if let (Some(w), Some(h)) = (dimension(doc, id, "width"), dimension(doc, id, "height"))
        && w <= ICON_MAX_PX
        && h <= ICON_MAX_PX
    {
        return ImagePlacement::Inline;
    }

    if let Some(src) = doc.attr(id, "src") {
        let file = src.rsplit(['/', '\\']).next().unwrap_or(src);
        if ICON_FILE.is_match(file) {
            return ImagePlacement::Inline;
        }
    }

    let Some(host) = doc
        .ancestors(id)
        .find(|&a| doc.tag(a).is_some_and(is_block_tag))
    else {
        return ImagePlacement::Block;
    };

    if doc.is_tag(host, "figure") {
        return ImagePlacement::Block;
    }
    if doc.tag(host).is_some_and(|t| t == "td" || t == "th") {
        return ImagePlacement::Inline;
    }
    if has_text_outside_blocks(doc, host) {
        return ImagePlacement::Inline;
    }
    ImagePlacement::Block
}

/// Pixel size from the attribute, falling back to the inline style
fn dimension(doc: &Document, id: NodeId, name: &str) -> Option<f32> {
    doc.attr(id, name).and_then(parse_px).or_else(|| {
        doc.attr(id, "style")
            .and_then(|style| style_property(style, name))
            .and_then(parse_px)
    })
}

/// Whether `host` has text of its own, not only inside nested blocks
fn has_text_outside_blocks(doc: &Document, host: NodeId) -> bool {
    let mut stack: Vec<NodeId> = doc.children(host).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if let Some(text) = doc.text(node) {
            if !text.trim().is_empty() {
                return true;
            }
            continue;
        }
        if doc.tag(node).is_some_and(is_block_tag) {
            continue;
        }
        stack.extend(doc.children(node).iter().rev().copied());
    }
    false
}

/// Whether a reference points outside the converted document set
#[must_use]
pub fn is_external(href: &str) -> bool {
    let href = href.trim();
    if href.starts_with("//") {
        return true;
    }
    match url::Url::parse(href) {
        // single-letter schemes are Windows drive letters
        Ok(url) => url.scheme().len() > 1,
        Err(_) => false,
    }
}

/// Whether a link target may be emitted at all
#[must_use]
pub fn is_safe_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    !(lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:"))
}

/// Rewrite an image source onto the consolidated `images/` layout.
///
/// URLs and data URIs are returned unchanged.
#[must_use]
pub fn normalize_image_path(src: &str) -> String {
    let src = src.trim();
    if src.is_empty() || is_external(src) {
        return src.to_string();
    }

    let path = src.replace('\\', "/");
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if let Some(first) = segments.first()
        && PROJECT_ROOTS.iter().any(|root| first.eq_ignore_ascii_case(root))
    {
        segments.remove(0);
    }

    let lowered: Vec<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
    let mut best: Option<(usize, usize)> = None;
    for start in 0..lowered.len() {
        for folder in IMAGE_FOLDERS {
            let end = start + folder.len();
            // keep at least the file name after the folder
            if end < lowered.len()
                && lowered[start..end].iter().zip(folder.iter()).all(|(a, b)| a == b)
            {
                if best.is_none_or(|(s, _)| start >= s) {
                    best = Some((start, end));
                }
                break;
            }
        }
    }

    match best {
        Some((_, end)) => format!("images/{}", segments[end..].join("/")),
        None => segments.join("/"),
    }
}

/// Retarget a link to the output format.
///
/// `.htm`/`.html` targets get the format's extension with query and fragment
/// preserved. External URLs, `mailto:`, absolute paths and same-page
/// fragments are returned unchanged.
#[must_use]
pub fn rewrite_link(href: &str, format: TargetFormat) -> String {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with('/')
        || is_external(href)
        || href.to_ascii_lowercase().starts_with("mailto:")
    {
        return href.to_string();
    }

    let href = href.replace('\\', "/");
    let split_at = href.find(['?', '#']).unwrap_or(href.len());
    let (path, suffix) = href.split_at(split_at);
    let lower = path.to_ascii_lowercase();
    let stem_len = if lower.ends_with(".html") {
        path.len() - 5
    } else if lower.ends_with(".htm") {
        path.len() - 4
    } else {
        return href;
    };
    format!("{}.{}{}", &path[..stem_len], format.extension(), suffix)
}

/// Split `target#fragment` into its parts; the fragment excludes `#`
#[must_use]
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment).filter(|f| !f.is_empty())),
        None => (href, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn img(src: &str) -> Node {
        Node::element("img", vec![]).with_attr("src", src)
    }

    fn image_in(doc: &Document) -> NodeId {
        doc.descendants(doc.root())
            .find(|&id| doc.is_tag(id, "img"))
            .expect("image present")
    }

    #[test]
    fn test_small_image_alone_in_paragraph_is_inline() {
        let doc = Document::from_node(Node::element(
            "p",
            vec![img("shot.png").with_attr("width", "16").with_attr("height", "16px")],
        ));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Inline);
    }

    #[test]
    fn test_large_image_alone_in_paragraph_is_block() {
        let doc = Document::from_node(Node::element(
            "p",
            vec![img("shot.png").with_attr("width", "400").with_attr("height", "300")],
        ));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Block);
    }

    #[test]
    fn test_large_image_in_cell_with_text_is_inline() {
        let doc = Document::from_node(Node::element(
            "table",
            vec![Node::element(
                "tr",
                vec![Node::element(
                    "td",
                    vec![
                        Node::text("Click "),
                        img("shot.png").with_attr("width", "400").with_attr("height", "300"),
                        Node::text(" to save"),
                    ],
                )],
            )],
        ));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Inline);
    }

    #[test]
    fn test_style_dimensions_and_icon_names() {
        let doc = Document::from_node(Node::element(
            "div",
            vec![img("a.png").with_attr("style", "width: 20px; height: 20px")],
        ));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Inline);

        let doc = Document::from_node(Node::element("div", vec![img("Resources/Images/icon_save.png")]));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Inline);

        let doc = Document::from_node(Node::element("div", vec![img("Resources/Images/dashboard.png")]));
        assert_eq!(classify_image(&doc, image_in(&doc)), ImagePlacement::Block);
    }

    #[test]
    fn test_normalize_image_path() {
        assert_eq!(normalize_image_path("../Resources/Images/ui/save.png"), "images/ui/save.png");
        assert_eq!(normalize_image_path("Content\\Resources\\Multimedia\\intro.mp4"), "images/intro.mp4");
        assert_eq!(normalize_image_path("/Images/a.png"), "images/a.png");
        assert_eq!(normalize_image_path("./pic.png"), "pic.png");
        assert_eq!(normalize_image_path("https://cdn.example.com/Images/a.png"), "https://cdn.example.com/Images/a.png");
        assert_eq!(normalize_image_path("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_rewrite_link_extensions() {
        assert_eq!(rewrite_link("topic.htm#step2", TargetFormat::AsciiDoc), "topic.adoc#step2");
        assert_eq!(rewrite_link("../guide/Intro.HTML", TargetFormat::Markdown), "../guide/Intro.md");
        assert_eq!(rewrite_link("topic.htm", TargetFormat::Html), "topic.html");
        assert_eq!(rewrite_link("https://example.com/a.htm", TargetFormat::AsciiDoc), "https://example.com/a.htm");
        assert_eq!(rewrite_link("mailto:docs@example.com", TargetFormat::AsciiDoc), "mailto:docs@example.com");
        assert_eq!(rewrite_link("#local", TargetFormat::AsciiDoc), "#local");
        assert_eq!(rewrite_link("/abs/page.htm", TargetFormat::AsciiDoc), "/abs/page.htm");
        assert_eq!(rewrite_link("manual.pdf", TargetFormat::AsciiDoc), "manual.pdf");
    }

    #[test]
    fn test_unsafe_hrefs() {
        assert!(!is_safe_href("JavaScript:alert(1)"));
        assert!(is_safe_href("topic.htm"));
    }
}
