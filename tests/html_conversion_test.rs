//! End-to-end conversion of parsed HTML pages

use docshift::{ConversionOptions, Document, Substitutions, TargetFormat, convert_html, convert_with};

mod common;
use common::html_page;

const BODY: &str = "<h1>Install</h1><p>Run <code>make</code> first.</p><ul><li>One</li><li>Two</li></ul>";

#[test]
fn test_page_to_asciidoc() {
    let result = convert_html(&html_page("Tab", BODY), TargetFormat::AsciiDoc, &ConversionOptions::default())
        .expect("Test operation should succeed");
    assert_eq!(result.content, "= Install\n\nRun `make` first.\n\n* One\n* Two\n");
    assert_eq!(result.metadata.title.as_deref(), Some("Install"));
    assert_eq!(result.metadata.word_count, 6);
    assert!(result.metadata.warnings.is_empty());
}

#[test]
fn test_page_to_markdown() {
    let result = convert_html(&html_page("Tab", BODY), TargetFormat::Markdown, &ConversionOptions::default())
        .expect("Test operation should succeed");
    assert_eq!(result.content, "# Install\n\nRun `make` first.\n\n- One\n- Two\n");
}

#[test]
fn test_page_to_html_drops_head_and_styles() {
    let out = convert_html(&html_page("Tab", BODY), TargetFormat::Html, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content;
    assert!(out.contains("<h1"));
    assert!(out.contains("Install</h1>"));
    assert!(out.contains("<code style="));
    assert!(out.contains("<li>One</li>"));
    assert!(!out.contains("color: red"));
    assert!(!out.contains("<title>"));
}

#[test]
fn test_raw_preset_skips_title_header() {
    let result = convert_html(&html_page("Tab", BODY), TargetFormat::AsciiDoc, &ConversionOptions::raw())
        .expect("Test operation should succeed");
    assert!(result.content.contains("== Install"));
    assert!(!result.content.starts_with("= "));
}

#[test]
fn test_callout_and_code_block() {
    let html = r#"<div class="note"><p>Save first.</p></div><pre class="language-bash">make install</pre>"#;
    let adoc = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content;
    assert!(adoc.contains("NOTE: Save first."), "got: {adoc}");
    assert!(adoc.contains("[source,bash]\n----\nmake install\n----"), "got: {adoc}");

    let md = convert_html(html, TargetFormat::Markdown, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content;
    assert!(md.contains("> **Note:** Save first."), "got: {md}");
    assert!(md.contains("```bash\nmake install\n```"), "got: {md}");
}

#[test]
fn test_madcap_variable_and_snippet() {
    let html = r#"<p>Welcome to <MadCap:variable name="General.ProductName"></MadCap:variable>.</p>
        <MadCap:snippetBlock src="../Resources/Snippets/unplug.flsnp"></MadCap:snippetBlock>"#;
    let document = Document::parse_html(html).expect("Test operation should succeed");
    let subs = Substitutions::new()
        .with_variable("General.ProductName", "Atlas")
        .with_snippet("Resources/Snippets/unplug.flsnp", "Do not unplug the device.");

    let result = convert_with(&document, TargetFormat::Markdown, &ConversionOptions::default(), &subs)
        .expect("Test operation should succeed");
    assert!(result.content.contains("Welcome to Atlas."), "got: {}", result.content);
    assert!(result.content.contains("Do not unplug the device."), "got: {}", result.content);
    assert!(result.metadata.warnings.is_empty(), "{:?}", result.metadata.warnings);

    let result = convert_with(&document, TargetFormat::AsciiDoc, &ConversionOptions::faithful(), &subs)
        .expect("Test operation should succeed");
    let variables = result.variables_file.expect("variables extracted");
    assert!(variables.ends_with(": Atlas\n"), "got: {variables}");
    assert!(!result.content.contains("Atlas"));
}

#[test]
fn test_unresolved_variable_warns_once() {
    let html = r#"<p><span data-variable="Missing.Name">fallback</span> and <span data-variable="Missing.Name">fallback</span></p>"#;
    let result = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default())
        .expect("Test operation should succeed");
    assert!(result.content.contains("fallback"));
    assert_eq!(result.metadata.warnings.len(), 1);
    assert!(result.metadata.warnings[0].contains("Missing.Name"));
}

#[test]
fn test_dropdown_follows_collapsible_option() {
    let html = "<MadCap:dropDown><MadCap:dropDownHead><MadCap:dropDownHotspot>More</MadCap:dropDownHotspot>\
        </MadCap:dropDownHead><MadCap:dropDownBody><p>Hidden text.</p></MadCap:dropDownBody></MadCap:dropDown>";

    let folded = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default().with_collapsible_blocks(true))
        .expect("Test operation should succeed")
        .content;
    assert!(folded.contains(".More\n[%collapsible]\n===="), "got: {folded}");
    assert!(folded.contains("Hidden text."));

    let headed = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default())
        .expect("Test operation should succeed")
        .content;
    assert!(!headed.contains("%collapsible"));
    assert!(headed.contains("More\n\nHidden text."), "got: {headed}");

    let html_out = convert_html(html, TargetFormat::Html, &ConversionOptions::default().with_collapsible_blocks(true))
        .expect("Test operation should succeed")
        .content;
    assert!(html_out.contains("<details"));
    assert!(html_out.contains("<summary>More</summary>"), "got: {html_out}");
}
