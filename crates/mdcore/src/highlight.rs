use lazy_static::lazy_static;
use regex::{Captures, Regex};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::markdown::unescape_html;

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"(?s)<pre><code class="language-([^"\s]+)">(.*?)</code></pre>"#)
            .expect("Invalid CODE_BLOCK regex pattern");
}

pub const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Highlights fenced code blocks inside already rendered HTML.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl CodeHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn has_theme(&self, theme_name: &str) -> bool {
        self.theme_set.themes.contains_key(theme_name)
    }

    fn theme(&self, theme_name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(theme_name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
            .or_else(|| self.theme_set.themes.values().next())
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lower = language.to_lowercase();
        if lower == "md" || lower == "markdown" {
            if let Some(md) = self.syntax_set.find_syntax_by_name("Markdown") {
                return Some(md);
            }
        }
        self.syntax_set.find_syntax_by_token(&lower)
    }

    /// Replace every `<pre><code class="language-x">` block whose language is
    /// known with inline-styled markup. Unknown languages are left untouched.
    pub fn highlight_html(&self, html: &str, theme_name: &str) -> String {
        let Some(theme) = self.theme(theme_name) else {
            log::warn!("No syntax themes available, skipping highlighting");
            return html.to_string();
        };

        CODE_BLOCK
            .replace_all(html, |caps: &Captures| {
                let original = caps[0].to_string();
                let Some(syntax) = self.find_syntax(&caps[1]) else {
                    return original;
                };
                let code = unescape_html(&caps[2]);
                match highlighted_html_for_string(&code, &self.syntax_set, syntax, theme) {
                    Ok(highlighted) => highlighted,
                    Err(e) => {
                        log::debug!("Highlighting {} block failed: {}", &caps[1], e);
                        original
                    }
                }
            })
            .into_owned()
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
