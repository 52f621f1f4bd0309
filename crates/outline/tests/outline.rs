use rfpcat_outline::{render_page, HeadingParser, HtmlEscaper, DEFAULT_PAGE_TITLE};

const CATEGORIZED: &str = "### Intro\nSome text\n### Scope\nMore text";

#[test]
fn anchors_precede_their_labels() {
    let outline = HeadingParser::default().parse(CATEGORIZED);
    let toc: Vec<_> = outline
        .toc()
        .iter()
        .map(|t| (t.label.clone(), t.anchor_id.clone()))
        .collect();
    assert_eq!(
        toc,
        vec![
            ("Intro".to_string(), "section-0".to_string()),
            ("Scope".to_string(), "section-1".to_string()),
        ]
    );

    let annotated = outline.annotated();
    let id0 = annotated.find("id=\"section-0\"").unwrap();
    let id1 = annotated.find("id=\"section-1\"").unwrap();
    assert!(id0 < annotated.find("Intro").unwrap());
    assert!(id1 < annotated.find("Scope").unwrap());
    assert!(annotated.contains("\nSome text\n"));
    assert!(annotated.ends_with("\nMore text"));
}

#[test]
fn k_headings_give_k_distinct_anchors_in_the_page() {
    let text = "Overview\n### A\n1\n### B\n2\n### C\n3\n";
    let outline = HeadingParser::default().parse(text);
    assert_eq!(outline.toc().len(), 3);

    let page = render_page(DEFAULT_PAGE_TITLE, &outline, &HtmlEscaper);
    for item in outline.toc() {
        let id = format!("id=\"{}\"", item.anchor_id);
        let href = format!("href=\"#{}\"", item.anchor_id);
        assert_eq!(page.matches(&id).count(), 1);
        assert_eq!(page.matches(&href).count(), 1);
    }
}

#[test]
fn injected_markup_never_reaches_the_page() {
    let text = "### <img src=x onerror=alert(1)>\n<iframe src=evil></iframe>";
    let outline = HeadingParser::default().parse(text);
    let page = render_page("<Title>", &outline, &HtmlEscaper);
    assert!(!page.contains("<img"));
    assert!(!page.contains("<iframe"));
    assert!(!page.contains("<Title>"));
    assert!(page.contains("&lt;iframe src=evil&gt;"));
}
