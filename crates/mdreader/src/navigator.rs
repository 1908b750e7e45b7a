use std::path::PathBuf;
use std::time::Duration;

use lazy_static::lazy_static;
use mdcore::{slugify, Anchor};
use regex::Regex;

use crate::document::DocumentId;

/// How long a jumped-to element stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(1500);

lazy_static! {
    static ref URL_SCHEME: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):").expect("Invalid URL_SCHEME regex pattern");
}

/// What a clicked `href` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Empty,
    /// `#fragment`, without the `#`.
    Anchor(String),
    /// `http://` or `https://`, handed to the browser.
    External(String),
    /// Any other scheme (`mailto:`, `file:`, ...); not followed.
    Unsupported(String),
    /// Relative (or absolute) filesystem path, fragment stripped.
    File {
        path: String,
        fragment: Option<String>,
    },
}

pub fn classify(href: &str) -> LinkTarget {
    let href = href.trim();
    if href.is_empty() {
        return LinkTarget::Empty;
    }
    if let Some(fragment) = href.strip_prefix('#') {
        return LinkTarget::Anchor(fragment.to_string());
    }

    if let Some(caps) = URL_SCHEME.captures(href) {
        let scheme = caps[1].to_ascii_lowercase();
        // A single letter is a Windows drive, not a scheme
        if scheme.len() > 1 {
            return if scheme == "http" || scheme == "https" {
                LinkTarget::External(href.to_string())
            } else {
                LinkTarget::Unsupported(href.to_string())
            };
        }
    }

    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment.to_string())),
        None => (href, None),
    };
    LinkTarget::File {
        path: path.to_string(),
        fragment,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    ExactId,
    Slug,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    pub id: String,
    pub strategy: MatchStrategy,
}

/// Find the element a `#fragment` refers to. Tried in order: an element
/// whose id equals the fragment, an element whose id equals the slugified
/// fragment, then a heading whose slugified text contains (or is contained
/// in) the slugified fragment. Within each step the first element in
/// document order wins.
pub fn resolve_anchor(fragment: &str, anchors: &[Anchor]) -> Option<AnchorMatch> {
    if let Some(anchor) = anchors.iter().find(|a| a.id == fragment) {
        return Some(AnchorMatch {
            id: anchor.id.clone(),
            strategy: MatchStrategy::ExactId,
        });
    }

    let wanted = slugify(fragment);
    if wanted.is_empty() {
        return None;
    }

    if let Some(anchor) = anchors.iter().find(|a| a.id == wanted) {
        return Some(AnchorMatch {
            id: anchor.id.clone(),
            strategy: MatchStrategy::Slug,
        });
    }

    anchors
        .iter()
        .find(|a| {
            let Some(text) = &a.heading_text else {
                return false;
            };
            let heading = slugify(text);
            !heading.is_empty() && (heading.contains(&wanted) || wanted.contains(&heading))
        })
        .map(|a| AnchorMatch {
            id: a.id.clone(),
            strategy: MatchStrategy::Fuzzy,
        })
}

/// Outcome of a link click, for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Ignored,
    Scrolled(AnchorMatch),
    AnchorNotFound(String),
    OpenedInBrowser(String),
    OpenedFile(DocumentId),
    FileNotFound(PathBuf),
    NoBasePath,
    OpenFailed(PathBuf),
}
