use std::sync::Arc;

use mdcore::sanitize::sanitize_preview;
use mdcore::{collect_anchors, Anchor, CodeHighlighter};

use crate::config::{PreviewConfig, Theme};
use crate::store::DocumentStore;

/// Turns markdown into preview markup. Implementations must be deterministic
/// and give every heading a slug id. The output is sanitized after
/// highlighting, so it need not be safe yet.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Rewrites code blocks of rendered markup in place.
pub trait SyntaxHighlighter: Send + Sync {
    fn highlight(&self, html: &mut String, theme: Theme);
}

/// GFM rendering through comrak.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakRenderer;

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, text: &str) -> String {
        mdcore::to_html(text)
    }
}

pub struct SyntectHighlighter {
    highlighter: CodeHighlighter,
    themes: PreviewConfig,
}

impl SyntectHighlighter {
    pub fn new(themes: PreviewConfig) -> Self {
        let highlighter = CodeHighlighter::new();
        for theme in [Theme::Dark, Theme::Light] {
            let name = themes.syntax_theme(theme);
            if !highlighter.has_theme(name) {
                log::warn!("Unknown syntax theme '{}', falling back", name);
            }
        }
        Self {
            highlighter,
            themes,
        }
    }
}

impl SyntaxHighlighter for SyntectHighlighter {
    fn highlight(&self, html: &mut String, theme: Theme) {
        *html = self
            .highlighter
            .highlight_html(html, self.themes.syntax_theme(theme));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    NoDocuments,
    NoContent,
    Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub kind: PreviewKind,
    pub html: String,
    pub theme: Theme,
}

/// Keeps the preview pane in step with the active buffer and the theme.
pub struct PreviewSynchronizer {
    renderer: Arc<dyn MarkdownRenderer>,
    highlighter: Arc<dyn SyntaxHighlighter>,
    current: Option<Preview>,
}

impl PreviewSynchronizer {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>, highlighter: Arc<dyn SyntaxHighlighter>) -> Self {
        Self {
            renderer,
            highlighter,
            current: None,
        }
    }

    /// Preview for `content` (`None` when no document is open). Pure: the
    /// same input always yields the same markup.
    pub fn render(&self, content: Option<&str>, theme: Theme) -> Preview {
        let Some(content) = content else {
            return Preview {
                kind: PreviewKind::NoDocuments,
                html: placeholder(theme, "No tabs open", "Click the + button to create a new tab", false),
                theme,
            };
        };

        if content.trim().is_empty() {
            return Preview {
                kind: PreviewKind::NoContent,
                html: placeholder(theme, "No content to preview", "Start typing in the editor...", true),
                theme,
            };
        }

        Preview {
            kind: PreviewKind::Rendered,
            html: self.render_body(content, theme),
            theme,
        }
    }

    /// Rendered, highlighted and sanitized markup without any placeholder
    /// handling. Highlighting sees the renderer's own escaping; the sanitizer
    /// re-serializes entities, so it runs last.
    pub fn render_body(&self, text: &str, theme: Theme) -> String {
        let mut html = self.renderer.render(text);
        self.highlighter.highlight(&mut html, theme);
        sanitize_preview(&html)
    }

    /// Re-render from the live buffer of the active document.
    pub fn sync(&mut self, store: &DocumentStore, theme: Theme) -> &Preview {
        let content = store.active().map(|_| store.surface().content());
        let preview = self.render(content.as_deref(), theme);
        self.current.insert(preview)
    }

    pub fn current(&self) -> Option<&Preview> {
        self.current.as_ref()
    }

    /// Element ids of the current preview, in document order.
    pub fn anchors(&self) -> Vec<Anchor> {
        match &self.current {
            Some(preview) if preview.kind == PreviewKind::Rendered => collect_anchors(&preview.html),
            _ => Vec::new(),
        }
    }
}

fn placeholder(theme: Theme, headline: &str, hint: &str, tinted_icon: bool) -> String {
    let (text_color, icon_color) = match theme {
        Theme::Dark => ("#888", "#666"),
        Theme::Light => ("#666", "#999"),
    };
    let icon_style = if tinted_icon {
        format!("font-size: 48px; margin-bottom: 20px; color: {};", icon_color)
    } else {
        "font-size: 48px; margin-bottom: 20px;".to_string()
    };
    format!(
        "<div class=\"preview-placeholder\" style=\"display: flex; align-items: center; \
         justify-content: center; height: 100%; min-height: 200px; color: {}; \
         font-size: 16px; text-align: center; padding: 40px;\">\
         <div><i class=\"fas fa-file-alt\" style=\"{}\"></i>\
         <p style=\"margin: 0; font-weight: 500;\">{}</p>\
         <p style=\"margin: 10px 0 0 0; font-size: 14px;\">{}</p></div></div>",
        text_color, icon_style, headline, hint
    )
}

const EXPORT_STYLESHEET: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }
        code {
            background-color: #f4f4f4;
            padding: 2px 6px;
            border-radius: 3px;
            font-family: 'Consolas', 'Courier New', monospace;
        }
        pre {
            background-color: #f4f4f4;
            padding: 16px;
            border-radius: 6px;
            overflow-x: auto;
        }
        pre code {
            background: none;
            padding: 0;
        }
        blockquote {
            border-left: 4px solid #007acc;
            padding-left: 16px;
            color: #666;
        }
        table {
            border-collapse: collapse;
            width: 100%;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #f4f4f4;
        }"#;

/// Standalone HTML page around an already rendered body.
pub fn export_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>{}</title>\n    <style>\n{}\n    </style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        ammonia::clean_text(title),
        EXPORT_STYLESHEET,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn synchronizer() -> PreviewSynchronizer {
        PreviewSynchronizer::new(
            Arc::new(ComrakRenderer),
            Arc::new(SyntectHighlighter::new(Config::default().preview)),
        )
    }

    #[test]
    fn test_no_documents_placeholder() {
        let preview = synchronizer().render(None, Theme::Dark);
        assert_eq!(preview.kind, PreviewKind::NoDocuments);
        assert!(preview.html.contains("No tabs open"));
        assert!(preview.html.contains("color: #888;"));
    }

    #[test]
    fn test_blank_content_placeholder_follows_theme() {
        let sync = synchronizer();
        let dark = sync.render(Some("  \n\t"), Theme::Dark);
        assert_eq!(dark.kind, PreviewKind::NoContent);
        assert!(dark.html.contains("No content to preview"));
        assert!(dark.html.contains("color: #666;\"></i>"));

        let light = sync.render(Some(""), Theme::Light);
        assert!(light.html.contains("color: #666;"));
        assert!(light.html.contains("color: #999;\"></i>"));
    }

    #[test]
    fn test_rendered_headings_have_ids() {
        let preview = synchronizer().render(Some("# Section One\n\ntext"), Theme::Light);
        assert_eq!(preview.kind, PreviewKind::Rendered);
        assert!(preview.html.contains(r#"<h1 id="section-one">"#));
    }

    #[test]
    fn test_render_is_idempotent() {
        let sync = synchronizer();
        let text = "# Title\n\n```rust\nfn main() {}\n```\n\n- [x] done\n";
        assert_eq!(sync.render(Some(text), Theme::Dark), sync.render(Some(text), Theme::Dark));
    }

    #[test]
    fn test_sync_tracks_store() {
        let mut sync = synchronizer();
        let mut store = DocumentStore::new();
        assert_eq!(sync.sync(&store, Theme::Dark).kind, PreviewKind::NoDocuments);

        store.create_document(None, Some("## Two".into()));
        assert_eq!(sync.sync(&store, Theme::Dark).kind, PreviewKind::Rendered);
        let ids: Vec<String> = sync.anchors().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["two".to_string()]);
    }

    #[test]
    fn test_non_breaking_space_in_code_block() {
        let preview = synchronizer().render(Some("```rust\nlet a\u{a0}= 1;\n```\n"), Theme::Light);
        assert!(preview.html.contains("style="));
        assert!(!preview.html.contains("&amp;nbsp;"));
    }

    #[test]
    fn test_rendered_markup_is_sanitized() {
        let preview = synchronizer().render(Some("[x](javascript:alert(1))"), Theme::Dark);
        assert!(!preview.html.contains("javascript:"));
    }

    #[test]
    fn test_export_document_escapes_title() {
        let page = export_document("a<b>.md", "<p>hi</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>a&lt;b&gt;.md</title>"));
        assert!(export_document("my notes.md", "").contains("<title>my&#32;notes.md</title>"));
        assert!(page.contains("<body>\n<p>hi</p>\n</body>"));
        assert!(page.contains("max-width: 800px;"));
    }
}
