//! Heading slugs shared by the renderer (heading ids) and the preview
//! navigator (fragment lookup).

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex =
        Regex::new(r"[^\w\s-]").expect("Invalid NON_SLUG_CHARS regex pattern");
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("Invalid WHITESPACE_RUN regex pattern");
    static ref HYPHEN_RUN: Regex = Regex::new(r"-+").expect("Invalid HYPHEN_RUN regex pattern");
}

/// Id used when a heading slugifies to nothing (e.g. a heading made of
/// punctuation only).
pub const EMPTY_SLUG_FALLBACK: &str = "heading";

/// Lowercase, drop everything but word characters, whitespace and hyphens,
/// turn whitespace runs into a single hyphen, squash repeated hyphens and
/// trim hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUN.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Hands out unique heading ids for one rendered document. The first
/// occurrence of a slug is used verbatim, later ones get `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = EMPTY_SLUG_FALLBACK.to_string();
        }

        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;

        // A generated "-1" suffix may collide with a literal heading of that name.
        if slug != base && self.seen.contains_key(&slug) {
            return self.slug(&slug);
        }
        self.seen.entry(slug.clone()).or_insert(1);
        slug
    }
}
