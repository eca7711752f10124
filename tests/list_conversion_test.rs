//! List conversion across the three target formats

use docshift::{ConversionOptions, Document, Node, TargetFormat, convert, convert_html};

mod common;
use common::nested_list;

fn to_format(document: &Document, format: TargetFormat) -> String {
    convert(document, format, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content
}

#[test]
fn test_asciidoc_markers_repeat_per_level() {
    let doc = Document::from_node(nested_list("ul", 5));
    assert_eq!(
        to_format(&doc, TargetFormat::AsciiDoc),
        "* level 1\n** level 2\n*** level 3\n**** level 4\n***** level 5\n"
    );

    let doc = Document::from_node(nested_list("ol", 5));
    assert_eq!(
        to_format(&doc, TargetFormat::AsciiDoc),
        ". level 1\n.. level 2\n... level 3\n.... level 4\n..... level 5\n"
    );
}

#[test]
fn test_asciidoc_markers_cap_at_five() {
    let doc = Document::from_node(nested_list("ul", 7));
    let out = to_format(&doc, TargetFormat::AsciiDoc);
    assert!(out.contains("\n***** level 6\n"), "got: {out}");
    assert!(out.contains("\n***** level 7"), "got: {out}");
    assert!(!out.contains("******"));
}

#[test]
fn test_nested_ordered_list_in_every_format() {
    let html = "<ol><li>A<ol><li>B</li></ol></li></ol>";
    let options = ConversionOptions::default();

    let adoc = convert_html(html, TargetFormat::AsciiDoc, &options).expect("Test operation should succeed");
    assert_eq!(adoc.content, ". A\n.. B\n");
    assert!(!adoc.content.contains('+'));

    let md = convert_html(html, TargetFormat::Markdown, &options).expect("Test operation should succeed");
    assert_eq!(md.content, "1. A\n   1. B\n");

    let out = convert_html(html, TargetFormat::Html, &options)
        .expect("Test operation should succeed")
        .content;
    let outer = out.find("<ol>").expect("outer list");
    let inner = out.rfind("<ol>").expect("inner list");
    assert!(outer < inner);
    assert!(out.contains("<li>A"));
    assert!(out.contains("<li>B</li>"));
    assert_eq!(out.matches("</ol>").count(), 2);
}

#[test]
fn test_markdown_bullets_rotate_with_indent() {
    let doc = Document::from_node(nested_list("ul", 3));
    let out = to_format(&doc, TargetFormat::Markdown);
    assert!(out.starts_with("- level 1\n"), "got: {out}");
    assert!(out.contains("\n  * level 2\n"), "got: {out}");
    assert!(out.contains("\n    + level 3"), "got: {out}");
}

#[test]
fn test_list_ceiling_flattens_with_warning() {
    let doc = Document::from_node(nested_list("ul", 6));
    let options = ConversionOptions::default().with_max_list_depth(2);
    let result = convert(&doc, TargetFormat::AsciiDoc, &options).expect("Test operation should succeed");

    for n in 1..=6 {
        assert!(result.content.contains(&format!("level {n}")), "level {n} lost: {}", result.content);
    }
    assert!(!result.content.contains("*** level 3"));
    assert_eq!(result.metadata.warnings.len(), 1);
    assert!(result.metadata.warnings[0].contains("flattened"));
}

#[test]
fn test_list_item_with_attached_paragraph() {
    let doc = Document::from_node(Node::element(
        "ul",
        vec![Node::element(
            "li",
            vec![
                Node::element("p", vec![Node::text("Open the file.")]),
                Node::element("p", vec![Node::text("It is read-only.")]),
            ],
        )],
    ));
    let out = to_format(&doc, TargetFormat::AsciiDoc);
    assert_eq!(out, "* Open the file.\n+\nIt is read-only.\n");
}

#[test]
fn test_lettered_list_keeps_level_marker_under_style_attribute() {
    // lettering comes from `[loweralpha]`; items keep the nesting-level `.`
    // marker rather than a literal `a.`
    let html = r#"<ol type="a"><li>first</li><li>second</li></ol>"#;
    let adoc = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default())
        .expect("Test operation should succeed");
    assert_eq!(adoc.content, "[loweralpha]\n. first\n. second\n");

    let html_out = convert_html(html, TargetFormat::Html, &ConversionOptions::default())
        .expect("Test operation should succeed");
    assert!(html_out.content.contains(r#"<ol type="a">"#));
}

#[test]
fn test_empty_list_produces_nothing() {
    let doc = Document::from_node(Node::element("div", vec![Node::element("ul", vec![])]));
    for format in [TargetFormat::AsciiDoc, TargetFormat::Markdown, TargetFormat::Html] {
        let out = to_format(&doc, format);
        assert!(out.trim().is_empty(), "{format}: {out:?}");
    }
}
