use ammonia::Builder;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Sanitize rendered preview markup while keeping what the preview needs:
/// heading ids for anchor targets, code block language classes, and the
/// inline styles of highlighted code.
pub fn sanitize_preview(html: &str) -> String {
    let mut builder = create_secure_sanitizer();
    for tag in HEADING_TAGS {
        builder.add_tag_attributes(tag, &["id"]);
    }
    builder
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("pre", &["style"])
        .add_tag_attributes("span", &["style"])
        .add_tag_attributes("li", &["id"])
        .add_tag_attributes("a", &["id"])
        .clean(html)
        .to_string()
}

fn create_secure_sanitizer() -> Builder<'static> {
    // ammonia's defaults already drop scripts, event handlers and
    // javascript: urls; relative links and fragments pass through
    Builder::new()
}
