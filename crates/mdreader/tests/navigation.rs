mod common;

use std::path::{Path, PathBuf};

use common::Harness;
use mdreader::navigator::{AnchorMatch, MatchStrategy, Navigation, HIGHLIGHT_DURATION};
use mdreader::status_manager::NoticeKind;

const GUIDE: &str = "# Guide\n\n## Section One\n\nBody.\n\n## Installing the tool\n\nSteps.\n";

#[tokio::test]
async fn test_fragment_resolves_by_exact_id() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/guide.md", GUIDE);
    ws.open_path(Path::new("/docs/guide.md")).await.unwrap();

    let nav = ws.handle_link_click("#section-one").await;
    assert_eq!(
        nav,
        Navigation::Scrolled(AnchorMatch {
            id: "section-one".into(),
            strategy: MatchStrategy::ExactId,
        })
    );
    assert_eq!(*h.preview.scrolled.lock().unwrap(), vec!["section-one".to_string()]);
    assert_eq!(
        *h.preview.flashed.lock().unwrap(),
        vec![("section-one".to_string(), HIGHLIGHT_DURATION)]
    );
}

#[tokio::test]
async fn test_fragment_resolves_by_slug_then_fuzzy() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/guide.md", GUIDE);
    ws.open_path(Path::new("/docs/guide.md")).await.unwrap();

    match ws.handle_link_click("#Section One").await {
        Navigation::Scrolled(found) => {
            assert_eq!(found.id, "section-one");
            assert_eq!(found.strategy, MatchStrategy::Slug);
        }
        other => panic!("unexpected navigation: {:?}", other),
    }

    match ws.handle_link_click("#installing").await {
        Navigation::Scrolled(found) => {
            assert_eq!(found.id, "installing-the-tool");
            assert_eq!(found.strategy, MatchStrategy::Fuzzy);
        }
        other => panic!("unexpected navigation: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_fragment_does_nothing() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/guide.md", GUIDE);
    ws.open_path(Path::new("/docs/guide.md")).await.unwrap();

    assert_eq!(
        ws.handle_link_click("#nowhere").await,
        Navigation::AnchorNotFound("nowhere".into())
    );
    assert!(h.preview.scrolled.lock().unwrap().is_empty());
    assert!(h.chrome.last_notice().is_none());
}

#[tokio::test]
async fn test_external_links_go_to_browser() {
    let h = Harness::new();
    let mut ws = h.workspace();
    ws.new_tab();

    let nav = ws.handle_link_click("https://example.com/page").await;
    assert_eq!(nav, Navigation::OpenedInBrowser("https://example.com/page".into()));
    assert_eq!(
        *h.browser.opened.lock().unwrap(),
        vec!["https://example.com/page".to_string()]
    );

    assert_eq!(ws.handle_link_click("mailto:someone@example.com").await, Navigation::Ignored);
    assert_eq!(ws.handle_link_click("").await, Navigation::Ignored);
    assert_eq!(h.browser.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_relative_link_opens_file() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/guide/index.md", "[next](../other.md)");
    h.fs.insert("/docs/other.md", "# Other");
    ws.open_path(Path::new("/docs/guide/index.md")).await.unwrap();

    let Navigation::OpenedFile(id) = ws.handle_link_click("../other.md").await else {
        panic!("expected the linked file to open");
    };
    assert_eq!(ws.store().active_id(), Some(id));
    assert_eq!(
        ws.store().get(id).unwrap().file_path(),
        Some(Path::new("/docs/other.md"))
    );
    assert_eq!(ws.store().len(), 2);
}

#[tokio::test]
async fn test_relative_link_with_fragment_scrolls_after_open() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/index.md", "[see](guide.md#section-one)");
    h.fs.insert("/docs/guide.md", GUIDE);
    ws.open_path(Path::new("/docs/index.md")).await.unwrap();

    let nav = ws.handle_link_click("guide.md#section-one").await;
    assert!(matches!(nav, Navigation::OpenedFile(_)));
    assert_eq!(*h.preview.scrolled.lock().unwrap(), vec!["section-one".to_string()]);
}

#[tokio::test]
async fn test_missing_linked_file_is_reported() {
    let h = Harness::new();
    let mut ws = h.workspace();
    h.fs.insert("/docs/index.md", "[gone](missing.md)");
    ws.open_path(Path::new("/docs/index.md")).await.unwrap();

    assert_eq!(
        ws.handle_link_click("missing.md").await,
        Navigation::FileNotFound(PathBuf::from("/docs/missing.md"))
    );
    assert_eq!(
        h.chrome.last_notice(),
        Some((NoticeKind::Error, "File not found: missing.md".to_string()))
    );
    assert_eq!(ws.store().len(), 1);
}

#[tokio::test]
async fn test_relative_link_needs_saved_document() {
    let h = Harness::new();
    let mut ws = h.workspace();
    ws.new_tab();
    ws.type_text("[x](other.md)");

    assert_eq!(ws.handle_link_click("other.md").await, Navigation::NoBasePath);
    let (kind, message) = h.chrome.last_notice().unwrap();
    assert_eq!(kind, NoticeKind::Warning);
    assert_eq!(message, "Cannot open linked file: current file path is unknown");
}
