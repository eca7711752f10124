//! Image placement, image path consolidation and link rewriting

use docshift::{ConversionOptions, TargetFormat, convert_html};

fn adoc(html: &str) -> docshift::ConversionResult {
    convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default()).expect("Test operation should succeed")
}

fn markdown(html: &str) -> docshift::ConversionResult {
    convert_html(html, TargetFormat::Markdown, &ConversionOptions::default()).expect("Test operation should succeed")
}

#[test]
fn test_large_image_alone_is_block() {
    let html = r#"<p><img src="../Resources/Images/shot.png" alt="Main window" width="400" height="300"></p>"#;

    let result = adoc(html);
    assert_eq!(result.content, "image::images/shot.png[Main window,400,300]\n");
    assert!(result.metadata.images.contains("images/shot.png"));

    assert_eq!(markdown(html).content, "![Main window](images/shot.png)\n");
}

#[test]
fn test_icon_in_sentence_is_inline() {
    let html = r#"<p>Click <img src="Images/icon_save.png" alt="Save"> to save.</p>"#;
    assert_eq!(adoc(html).content, "Click image:images/icon_save.png[Save] to save.\n");
}

#[test]
fn test_image_in_table_cell_is_inline() {
    let html = r#"<table><tr><td><img src="Images/diagram.png" alt="Diagram" width="600" height="400"></td></tr></table>"#;
    let result = adoc(html);
    assert!(result.content.contains("| image:images/diagram.png[Diagram,600,400]"), "got: {}", result.content);
    assert!(!result.content.contains("image::"));
}

#[test]
fn test_image_paths_collected_once() {
    let html = r#"<div><p>A <img src="Images/a.png" alt="a"> and <img src="Images/a.png" alt="a"></p>
        <p><img src="https://cdn.example.com/b.png" alt="b"></p>
        <p><img src="data:image/png;base64,AAAA" alt="c"></p></div>"#;
    let images: Vec<String> = adoc(html).metadata.images.into_iter().collect();
    assert_eq!(images, vec!["https://cdn.example.com/b.png".to_string(), "images/a.png".to_string()]);
}

#[test]
fn test_script_image_dropped() {
    let html = r#"<p>Before <img src="javascript:alert(1)" alt="x"> after</p>"#;
    let result = adoc(html);
    assert!(!result.content.contains("javascript"));
    assert!(result.metadata.images.is_empty());
}

#[test]
fn test_cross_document_links_retargeted() {
    let html = r#"<p>See <a href="setup.htm#ports">Ports</a> now.</p>"#;

    assert_eq!(adoc(html).content, "See xref:setup.adoc#ports[Ports] now.\n");
    assert_eq!(markdown(html).content, "See [Ports](setup.md#ports) now.\n");

    let out = convert_html(html, TargetFormat::Html, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content;
    assert!(out.contains(r#"<a href="setup.html#ports">Ports</a>"#), "got: {out}");
}

#[test]
fn test_links_untouched_without_rewrite() {
    let html = r#"<p>See <a href="setup.htm#ports">Ports</a> now.</p>"#;
    let options = ConversionOptions::default().with_rewrite_links(false);
    let result = convert_html(html, TargetFormat::AsciiDoc, &options).expect("Test operation should succeed");
    assert_eq!(result.content, "See link:setup.htm#ports[Ports] now.\n");
}

#[test]
fn test_external_and_unsafe_links() {
    let html = r#"<p><a href="https://example.com/docs">docs</a> and <a href="javascript:void(0)">nothing</a></p>"#;
    assert_eq!(adoc(html).content, "https://example.com/docs[docs] and nothing\n");
    assert_eq!(markdown(html).content, "[docs](https://example.com/docs) and nothing\n");
}
