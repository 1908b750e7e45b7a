#[cfg(test)]
mod unit_tests {
    use super::super::*;

    #[test]
    fn test_preview_pipeline_keeps_heading_ids() {
        let html = sanitize::sanitize_preview(&to_html("# Section One\n\n[jump](#section-one)\n"));
        assert!(html.contains(r#"<h1 id="section-one">"#));
        assert!(html.contains(r##"href="#section-one""##));
    }

    #[test]
    fn test_preview_pipeline_sanitizes_highlighted_code() {
        let md = "```rust\nfn main() {}\n```\n";
        let highlighted = CodeHighlighter::new().highlight_html(&to_html(md), "InspiredGitHub");
        let sanitized = sanitize::sanitize_preview(&highlighted);
        assert!(sanitized.contains("<span style="));
        assert!(sanitized.contains("fn"));
    }

    #[test]
    fn test_non_breaking_space_in_code_is_not_double_escaped() {
        let md = "```rust\nlet a\u{a0}= \"x & y\";\n```\n";
        let highlighted = CodeHighlighter::new().highlight_html(&to_html(md), "InspiredGitHub");
        let sanitized = sanitize::sanitize_preview(&highlighted);
        assert!(sanitized.contains("style="));
        assert!(!sanitized.contains("&amp;nbsp;"));
        assert!(!sanitized.contains("&amp;amp;"));
        assert!(sanitized.contains("&amp;"));
    }

    #[test]
    fn test_markdown_security_escape() {
        let markdown = "<script>alert('XSS')</script>";
        let html = markdown::to_html(markdown);
        let sanitized = sanitize::sanitize_preview(&html);
        assert!(!sanitized.contains("<script>"));
    }

    #[test]
    fn test_headings_and_anchors_agree() {
        let rendered = render("# One\n\n## Two words\n");
        let anchors = collect_anchors(&rendered.html);
        let heading_ids: Vec<&str> = rendered.headings.iter().map(|h| h.id.as_str()).collect();
        let anchor_ids: Vec<&str> = anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(heading_ids, anchor_ids);
        assert_eq!(slugify(&rendered.headings[1].text), "two-words");
    }
}
