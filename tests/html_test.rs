//! Integration tests for editor content conversion.

use boletin::html::{parse, to_paragraphs, to_plain_text, Inline, NO_CONTENT};
use boletin::render::footer_text;
use boletin::Alignment;

#[test]
fn test_bold_span_yields_three_runs() {
    let paragraphs = to_paragraphs(r#"<p style="text-align:center">A <strong>B</strong> C</p>"#);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].style.alignment, Alignment::Center);

    let runs: Vec<_> = paragraphs[0]
        .runs()
        .map(|r| (r.text.as_str(), r.style.bold))
        .collect();
    assert_eq!(runs, vec![("A ", false), ("B", true), (" C", false)]);
}

#[test]
fn test_nested_bold() {
    let parsed = parse("<p><b>uno <strong>dos</strong> tres</b> cuatro</p>");
    assert_eq!(
        parsed[0].inlines,
        vec![
            Inline::Bold("uno dos tres".into()),
            Inline::Text(" cuatro".into()),
        ]
    );
}

#[test]
fn test_typical_decree() {
    let html = concat!(
        r#"<p style="text-align: center;"><strong>DECRETO Nº 0044</strong></p>"#,
        "<p>VISTO:</p>",
        r#"<p style="text-align: justify;">El expediente; y<br>CONSIDERANDO:</p>"#,
        "<p></p>",
    );
    let paragraphs = to_paragraphs(html);
    assert_eq!(paragraphs.len(), 4);
    assert_eq!(paragraphs[2].style.alignment, Alignment::Justify);
    assert_eq!(
        to_plain_text(html),
        "DECRETO Nº 0044\n\nVISTO:\n\nEl expediente; y\nCONSIDERANDO:"
    );
}

#[test]
fn test_whitespace_only_content() {
    assert_eq!(to_paragraphs(" \n\t ")[0].plain_text(), NO_CONTENT);
}

#[test]
fn test_footer_substitution_is_exact() {
    assert_eq!(footer_text("Página {pageNumber} • X", 7), "Página 7 • X");
    assert_eq!(footer_text("{pagenumber}", 7), "{pagenumber}");
}
