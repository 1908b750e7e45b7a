use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentId};
use crate::paths::normalize_path;
use crate::surface::EditingSurface;

/// Presentation of one tab, pushed to the chrome whenever the set of
/// documents or any of their titles/flags changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: DocumentId,
    pub title: String,
    pub file_path: Option<PathBuf>,
    pub is_modified: bool,
    pub is_active: bool,
}

/// Ordered open documents plus the active pointer. The store owns the single
/// editing surface; only the active document's text is loaded into it.
///
/// Unknown ids are ignored rather than reported: ids only come from the
/// store itself.
pub struct DocumentStore {
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u64,
    surface: EditingSurface,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            next_id: 0,
            surface: EditingSurface::new(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id() == id)
    }

    fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id() == id)
    }

    fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id() == id)
    }

    pub fn surface(&self) -> &EditingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditingSurface {
        &mut self.surface
    }

    /// Append a document and make it active. A path that is already open is
    /// not duplicated: the existing document is activated and its id
    /// returned, `content` is ignored.
    pub fn create_document(&mut self, path: Option<PathBuf>, content: Option<String>) -> DocumentId {
        let path = path.map(|p| normalize_path(&p));
        if let Some(existing) = path.as_deref().and_then(|p| self.find_by_path(p)) {
            log::debug!("{} already open as {}", path_display(&path), existing);
            self.switch_active(existing);
            return existing;
        }

        let id = DocumentId::new(self.next_id);
        self.next_id += 1;

        self.flush_active();
        self.documents
            .push(Document::new(id, path, content.unwrap_or_default()));
        self.activate(id);
        log::debug!("Created document {}", id);
        id
    }

    /// Make `id` active, loading its snapshot into the surface. Returns false
    /// (and changes nothing) for an unknown id.
    pub fn switch_active(&mut self, id: DocumentId) -> bool {
        if self.index_of(id).is_none() {
            log::debug!("Ignoring switch to unknown document {}", id);
            return false;
        }
        if self.active == Some(id) {
            return true;
        }
        self.flush_active();
        self.activate(id);
        true
    }

    fn activate(&mut self, id: DocumentId) {
        let content = self
            .get(id)
            .map(|d| d.content().to_string())
            .unwrap_or_default();
        // The programmatic change is deliberately not fed back as an edit
        let _ = self.surface.set_content(&content);
        self.active = Some(id);
    }

    /// Remove a document. When it was active, its neighbour at the same index
    /// (or the new last one) becomes active; when none remain the surface is
    /// cleared and nothing is active.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<Document> {
        let index = self.index_of(id)?;
        let was_active = self.active == Some(id);
        if was_active {
            self.flush_active();
        }

        let removed = self.documents.remove(index);

        if was_active {
            if self.documents.is_empty() {
                let _ = self.surface.set_content("");
                self.active = None;
            } else {
                let next_index = index.min(self.documents.len() - 1);
                let next = self.documents[next_index].id();
                self.activate(next);
            }
        }
        Some(removed)
    }

    /// Returns true when the document must be confirmed before closing:
    /// modified and backed by a file.
    pub fn needs_close_confirmation(&self, id: DocumentId) -> bool {
        self.get(id)
            .map(|d| d.is_modified() && d.file_path().is_some())
            .unwrap_or(false)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        let wanted = normalize_path(path);
        self.documents
            .iter()
            .find(|d| d.file_path().map(normalize_path).as_deref() == Some(wanted.as_path()))
            .map(Document::id)
    }

    /// Copy the live buffer into the active document, recomputing its
    /// modified flag and display name. Returns the active id when the
    /// snapshot changed.
    pub fn update_active_content(&mut self) -> Option<DocumentId> {
        let id = self.active?;
        let content = self.surface.content();
        let doc = self.get_mut(id)?;
        doc.set_content(content).then_some(id)
    }

    fn flush_active(&mut self) {
        self.update_active_content();
    }

    /// Load a file into the active document, replacing its path, text and
    /// saved baseline.
    pub fn load_into_active(&mut self, path: PathBuf, content: String) -> Option<DocumentId> {
        let id = self.active?;
        let path = normalize_path(&path);
        self.get_mut(id)?.load(path, content.clone());
        let _ = self.surface.set_content(&content);
        Some(id)
    }

    pub fn set_file_path(&mut self, id: DocumentId, path: PathBuf) -> bool {
        let path = normalize_path(&path);
        match self.get_mut(id) {
            Some(doc) => {
                doc.set_file_path(path);
                true
            }
            None => false,
        }
    }

    /// Record a successful write of `written` for `id`, if it is still open.
    pub fn mark_saved(&mut self, id: DocumentId, written: &str) -> bool {
        if self.active == Some(id) {
            self.flush_active();
        }
        match self.get_mut(id) {
            Some(doc) => {
                doc.mark_saved(written);
                true
            }
            None => {
                log::debug!("Saved document {} is no longer open", id);
                false
            }
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(Document::is_modified)
    }

    pub fn tab_views(&self) -> Vec<TabView> {
        self.documents
            .iter()
            .map(|d| TabView {
                id: d.id(),
                title: d.display_name().to_string(),
                file_path: d.file_path().map(Path::to_path_buf),
                is_modified: d.is_modified(),
                is_active: self.active == Some(d.id()),
            })
            .collect()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn path_display(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
