//! Element ids present in rendered preview markup, used to resolve
//! `#fragment` links.

use lazy_static::lazy_static;
use regex::Regex;

use crate::markdown::text_content;

lazy_static! {
    static ref ELEMENT_ID: Regex = Regex::new(r#"<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?\sid="([^"]*)"[^>]*>"#)
        .expect("Invalid ELEMENT_ID regex pattern");
    static ref HEADING_WITH_ID: Regex =
        Regex::new(r#"(?s)<h[1-6]\b[^>]*?\sid="([^"]*)"[^>]*>(.*?)</h[1-6]>"#)
            .expect("Invalid HEADING_WITH_ID regex pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: String,
    /// Visible text when the element is a heading.
    pub heading_text: Option<String>,
}

/// All elements carrying an `id`, in document order.
pub fn collect_anchors(html: &str) -> Vec<Anchor> {
    let headings: Vec<(usize, String)> = HEADING_WITH_ID
        .captures_iter(html)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            Some((start, text_content(&caps[2])))
        })
        .collect();

    ELEMENT_ID
        .captures_iter(html)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let heading_text = headings
                .iter()
                .find(|(heading_start, _)| *heading_start == start)
                .map(|(_, text)| text.clone());
            Some(Anchor {
                id: caps[2].to_string(),
                heading_text,
            })
        })
        .collect()
}
