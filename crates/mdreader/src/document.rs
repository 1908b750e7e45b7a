use std::fmt;
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

/// Display name of a document that has neither a path nor a first line.
pub const UNTITLED: &str = "Untitled";

const TITLE_MAX_GRAPHEMES: usize = 20;
const TITLE_ELLIPSIS: &str = "...";

/// Stable tab identifier, handed out in increasing order by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One open markdown buffer (one tab).
///
/// `content` is the last snapshot taken from the editing surface while the
/// document was active; `saved_content` is the text as of the last
/// successful load or save and drives `is_modified`.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    file_path: Option<PathBuf>,
    display_name: String,
    content: String,
    saved_content: String,
    is_modified: bool,
}

impl Document {
    pub(crate) fn new(id: DocumentId, file_path: Option<PathBuf>, content: String) -> Self {
        let display_name = file_path
            .as_deref()
            .map(file_display_name)
            .unwrap_or_else(|| UNTITLED.to_string());
        Self {
            id,
            file_path,
            display_name,
            saved_content: content.clone(),
            content,
            is_modified: false,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn saved_content(&self) -> &str {
        &self.saved_content
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn is_untitled(&self) -> bool {
        self.file_path.is_none()
    }

    /// Content differs from what is on disk and there is somewhere to write it.
    pub fn needs_autosave(&self) -> bool {
        self.file_path.is_some() && self.is_modified && self.content != self.saved_content
    }

    /// Take a new snapshot of the buffer. Returns true when the text changed.
    pub(crate) fn set_content(&mut self, content: String) -> bool {
        if content == self.content {
            return false;
        }
        self.content = content;
        self.is_modified = self.content != self.saved_content;
        self.refresh_display_name();
        true
    }

    /// Record `written` as the on-disk text. The buffer may have moved on
    /// while the write was in flight, so the flag is recomputed rather than
    /// cleared.
    pub(crate) fn mark_saved(&mut self, written: &str) {
        self.saved_content = written.to_string();
        self.is_modified = self.content != self.saved_content;
    }

    pub(crate) fn set_file_path(&mut self, path: PathBuf) {
        self.display_name = file_display_name(&path);
        self.file_path = Some(path);
    }

    /// Replace everything with freshly loaded file state.
    pub(crate) fn load(&mut self, path: PathBuf, content: String) {
        self.set_file_path(path);
        self.saved_content = content.clone();
        self.content = content;
        self.is_modified = false;
    }

    fn refresh_display_name(&mut self) {
        if self.file_path.is_some() || self.display_name != UNTITLED {
            return;
        }
        if let Some(title) = title_from_first_line(&self.content) {
            self.display_name = title;
        }
    }
}

pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Tab title for an untitled buffer: its trimmed first line, cut to 20
/// graphemes with an ellipsis when longer. `None` for a blank first line.
pub fn title_from_first_line(content: &str) -> Option<String> {
    let first_line = content.split('\n').next()?.trim();
    if first_line.is_empty() {
        return None;
    }

    let graphemes: Vec<&str> = first_line.graphemes(true).collect();
    if graphemes.len() > TITLE_MAX_GRAPHEMES {
        let cut = graphemes[..TITLE_MAX_GRAPHEMES].concat();
        Some(format!("{}{}", cut, TITLE_ELLIPSIS))
    } else {
        Some(first_line.to_string())
    }
}
