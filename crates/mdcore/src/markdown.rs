use comrak::{markdown_to_html, ComrakOptions};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::slug::Slugger;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"(?s)<h([1-6])>(.*?)</h[1-6]>")
        .expect("Invalid HEADING regex pattern");
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("Invalid TAG regex pattern");
}

/// A heading found while rendering, with the id assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub headings: Vec<Heading>,
}

pub fn to_html(src: &str) -> String {
    render(src).html
}

/// Render GFM to HTML and give every heading a slug id.
pub fn render(src: &str) -> RenderedMarkdown {
    let opt = create_comrak_options();
    let html = markdown_to_html(src, &opt);
    assign_heading_ids(&html)
}

fn create_comrak_options() -> ComrakOptions<'static> {
    let mut opt = ComrakOptions::default();

    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;
    opt.extension.footnotes = true;

    // Raw HTML in the source is shown as text, never executed in the preview
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}

pub fn assign_heading_ids(html: &str) -> RenderedMarkdown {
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();

    let html = HEADING
        .replace_all(html, |caps: &Captures| {
            let level = &caps[1];
            let inner = &caps[2];
            let text = text_content(inner);
            let id = slugger.slug(&text);
            headings.push(Heading {
                level: level.parse().unwrap_or(1),
                id: id.clone(),
                text,
            });
            format!(r#"<h{level} id="{id}">{inner}</h{level}>"#)
        })
        .into_owned();

    RenderedMarkdown { html, headings }
}

/// Visible text of an HTML fragment: tags removed, entities decoded.
pub fn text_content(html: &str) -> String {
    let without_tags = TAG.replace_all(html, "");
    unescape_html(without_tags.trim())
}

pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
