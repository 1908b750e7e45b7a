pub mod anchors;
pub mod highlight;
pub mod markdown;
pub mod sanitize;
pub mod slug;

pub use anchors::{collect_anchors, Anchor};
pub use highlight::CodeHighlighter;
pub use markdown::{render, to_html, Heading, RenderedMarkdown};
pub use slug::{slugify, Slugger};

#[cfg(test)]
mod tests;
