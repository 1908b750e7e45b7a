use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;

use crate::autosave::AutosaveScheduler;
use crate::config::{Config, Theme, ViewMode};
use crate::document::DocumentId;
use crate::navigator::{classify, resolve_anchor, LinkTarget, Navigation, HIGHLIGHT_DURATION};
use crate::paths::{is_supported_document, normalize_path, resolve_relative};
use crate::platform::Collaborators;
use crate::preferences::PreferenceStore;
use crate::preview::{export_document, ComrakRenderer, PreviewSynchronizer, SyntectHighlighter};
use crate::status_manager::{status_line, window_title, NoticeKind, StatusManager};
use crate::store::DocumentStore;
use crate::surface::{ContentChange, EditingSurface};

const UNSAVED_OPEN_PROMPT: &str = "You have unsaved changes. Continue without saving?";

/// The application core: open documents, the shared editing surface and
/// everything kept in sync with them.
///
/// Every command takes `&mut self`, including across dialog and file I/O
/// awaits, so commands never interleave. A continuation therefore always
/// sees the state its command started from.
pub struct Workspace {
    store: DocumentStore,
    preview: PreviewSynchronizer,
    autosave: AutosaveScheduler,
    status: StatusManager,
    prefs: PreferenceStore,
    theme: Theme,
    view_mode: ViewMode,
    io: Collaborators,
}

impl Workspace {
    pub fn new(config: &Config, prefs: PreferenceStore, io: Collaborators) -> Self {
        let preview = PreviewSynchronizer::new(
            Arc::new(ComrakRenderer),
            Arc::new(SyntectHighlighter::new(config.preview.clone())),
        );
        Self::with_preview(config, prefs, io, preview)
    }

    pub fn with_preview(
        config: &Config,
        prefs: PreferenceStore,
        io: Collaborators,
        preview: PreviewSynchronizer,
    ) -> Self {
        let theme = prefs.theme().unwrap_or_default();
        Self {
            store: DocumentStore::new(),
            preview,
            autosave: AutosaveScheduler::new(config.autosave.enabled, config.autosave.interval()),
            status: StatusManager::new(),
            prefs,
            theme,
            view_mode: config.view_mode,
            io,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    pub fn status(&self) -> &StatusManager {
        &self.status
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn preview(&self) -> &PreviewSynchronizer {
        &self.preview
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.has_unsaved_changes()
    }

    // -- notifications -----------------------------------------------------

    fn notify(&mut self, content: impl Into<String>, kind: NoticeKind) {
        let notice = self.status.post(content, kind).clone();
        self.io.chrome.on_notice(&notice);
    }

    fn refresh_status(&self) {
        self.io
            .chrome
            .on_status_changed(&status_line(&self.store, self.theme, self.view_mode));
    }

    fn refresh_preview(&mut self) {
        if !self.store.surface().is_ready() {
            log::debug!("Editor not ready, deferring preview");
            return;
        }
        let preview = self.preview.sync(&self.store, self.theme);
        self.io.preview.show(preview);
    }

    fn refresh_title(&self) {
        self.io.chrome.on_title_changed(&window_title(&self.store));
    }

    fn refresh_documents(&self) {
        self.io.chrome.on_documents_changed(&self.store.tab_views());
    }

    fn refresh_all(&mut self) {
        self.refresh_documents();
        self.refresh_status();
        self.refresh_preview();
        self.refresh_title();
    }

    /// Expire the status notice if its time is up.
    pub fn tick(&mut self) {
        self.status.update();
    }

    // -- editing -----------------------------------------------------------

    /// Propagate a user edit: store, status, preview, title, then autosave.
    fn handle_change(&mut self, change: ContentChange) {
        if !change.is_user() {
            return;
        }

        let renamed_or_flagged = self.store.update_active_content().is_some();
        self.refresh_status();
        self.refresh_preview();
        self.refresh_title();
        if renamed_or_flagged {
            self.refresh_documents();
        }

        if self.store.active().is_some_and(|doc| doc.file_path().is_some()) {
            self.autosave.note_edit(Instant::now());
        }
    }

    /// A pending autosave only ever writes the active document, so it is
    /// dropped when the newly active one has nowhere to be saved.
    fn settle_autosave(&mut self) {
        if !self.store.active().is_some_and(|doc| doc.file_path().is_some()) {
            self.autosave.cancel();
        }
    }

    fn with_surface<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut EditingSurface) -> Option<ContentChange>,
    {
        if self.store.active_id().is_none() {
            log::debug!("Ignoring edit with no open document");
            return;
        }
        if let Some(change) = edit(self.store.surface_mut()) {
            self.handle_change(change);
        }
    }

    pub fn type_text(&mut self, text: &str) {
        self.with_surface(|surface| surface.insert_str(text));
    }

    pub fn delete_backward(&mut self, count: usize) {
        self.with_surface(|surface| surface.delete_backward(count));
    }

    pub fn replace_content(&mut self, text: &str) {
        self.with_surface(|surface| surface.replace_all(text));
    }

    pub fn move_cursor(&mut self, line: usize, column: usize) {
        if self.store.active_id().is_none() {
            return;
        }
        self.store.surface_mut().set_cursor_position(line, column);
        self.refresh_status();
    }

    /// The editing widget finished initializing; render what it holds.
    pub fn on_editor_ready(&mut self) {
        self.store.surface_mut().mark_ready();
        self.refresh_all();
    }

    // -- tabs --------------------------------------------------------------

    pub fn new_tab(&mut self) -> DocumentId {
        let id = self.store.create_document(None, None);
        self.settle_autosave();
        self.refresh_all();
        id
    }

    pub fn switch_to(&mut self, id: DocumentId) -> bool {
        if !self.store.switch_active(id) {
            return false;
        }
        self.settle_autosave();
        self.refresh_all();
        true
    }

    /// Close a tab. Returns false when the id is unknown or the user declines
    /// to discard unsaved changes.
    pub async fn close_tab(&mut self, id: DocumentId, skip_confirm: bool) -> bool {
        let Some(name) = self.store.get(id).map(|d| d.display_name().to_string()) else {
            return false;
        };

        if !skip_confirm && self.store.needs_close_confirmation(id) {
            let prompt = format!("\"{}\" has unsaved changes. Close it anyway?", name);
            if !self.io.dialogs.confirm(&prompt).await {
                log::debug!("Close of {} declined", id);
                return false;
            }
        }

        self.store.remove_document(id);
        self.settle_autosave();
        self.refresh_all();
        log::info!("Closed {}", name);
        true
    }

    // -- opening -----------------------------------------------------------

    /// Ask for a file and load it into the active tab (or a new tab when none
    /// is open). A file that is already open is switched to instead.
    pub async fn open(&mut self) -> bool {
        let needs_confirm = self.store.active().is_some_and(|doc| {
            doc.is_modified() && doc.file_path().is_some() && !self.store.surface().is_blank()
        });
        if needs_confirm && !self.io.dialogs.confirm(UNSAVED_OPEN_PROMPT).await {
            return false;
        }

        let Some(path) = self.io.dialogs.choose_open_path().await else {
            return false;
        };
        let path = normalize_path(&path);

        if let Some(existing) = self.store.find_by_path(&path) {
            self.switch_to(existing);
            self.remember_recent(&path).await;
            return true;
        }

        let content = match self.io.persistence.read_file(&path).await {
            Ok(content) => content,
            Err(e) => {
                self.notify(format!("Failed to open file: {}", e), NoticeKind::Error);
                return false;
            }
        };

        match self.store.active_id() {
            Some(_) => {
                self.store.load_into_active(path.clone(), content);
            }
            None => {
                self.store.create_document(Some(path.clone()), Some(content));
            }
        }
        // The freshly loaded text is clean.
        self.autosave.cancel();
        self.refresh_all();
        self.remember_recent(&path).await;
        true
    }

    /// Open `path` in a new tab, or switch to it when already open.
    pub async fn open_path(&mut self, path: &Path) -> Option<DocumentId> {
        let path = normalize_path(path);
        if let Some(existing) = self.store.find_by_path(&path) {
            self.switch_to(existing);
            self.remember_recent(&path).await;
            return Some(existing);
        }

        match self.io.persistence.read_file(&path).await {
            Ok(content) => {
                let id = self.store.create_document(Some(path.clone()), Some(content));
                self.settle_autosave();
                self.refresh_all();
                self.remember_recent(&path).await;
                Some(id)
            }
            Err(e) => {
                self.notify(format!("Failed to open file: {}", e), NoticeKind::Error);
                None
            }
        }
    }

    pub async fn open_recent(&mut self, index: usize) -> Option<DocumentId> {
        let Some(entry) = self.prefs.recent_files().into_iter().nth(index) else {
            self.notify(
                format!("No recent file at position {}", index + 1),
                NoticeKind::Warning,
            );
            return None;
        };
        self.open_path(&entry.path).await
    }

    /// Open every dropped markdown or text file; anything else is skipped.
    pub async fn handle_dropped_paths(&mut self, paths: &[PathBuf]) -> Vec<DocumentId> {
        let mut opened = Vec::new();
        for path in paths {
            if !is_supported_document(path) {
                log::info!("Skipping dropped file with unsupported type: {}", path.display());
                continue;
            }
            if !self.io.persistence.is_file(path).await {
                log::info!("Skipping dropped path that is not a file: {}", path.display());
                continue;
            }
            if let Some(id) = self.open_path(path).await {
                opened.push(id);
            }
        }
        opened
    }

    async fn remember_recent(&mut self, path: &Path) {
        self.prefs.add_recent_file(path, Utc::now());
        if let Err(e) = self.prefs.flush().await {
            log::warn!("Failed to store recent files: {}", e);
        }
    }

    // -- saving ------------------------------------------------------------

    /// Write the active document to its path, or ask for one.
    pub async fn save(&mut self) -> bool {
        self.store.update_active_content();
        let Some((id, path)) = self
            .store
            .active()
            .map(|doc| (doc.id(), doc.file_path().map(Path::to_path_buf)))
        else {
            return false;
        };
        let Some(path) = path else {
            return self.save_as().await;
        };

        let content = self.store.surface().content();
        if self.write_document(id, &path, &content).await {
            self.notify(format!("Saved {}", path.display()), NoticeKind::Success);
            true
        } else {
            false
        }
    }

    pub async fn save_as(&mut self) -> bool {
        self.store.update_active_content();
        let Some((id, suggested)) = self.store.active().map(|doc| {
            let stem = match doc.file_path() {
                Some(path) => path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| doc.display_name().to_string()),
                None => doc.display_name().to_string(),
            };
            (doc.id(), format!("{}.md", stem))
        }) else {
            return false;
        };

        let Some(path) = self.io.dialogs.choose_save_path(&suggested).await else {
            return false;
        };
        let path = normalize_path(&path);

        if let Some(other) = self.store.find_by_path(&path) {
            if other != id {
                self.notify(
                    format!("{} is already open in another tab", path.display()),
                    NoticeKind::Warning,
                );
                return false;
            }
        }

        let content = self.store.surface().content();
        if !self.write_document(id, &path, &content).await {
            return false;
        }
        self.store.set_file_path(id, path.clone());
        self.refresh_all();
        self.remember_recent(&path).await;
        self.notify(format!("Saved {}", path.display()), NoticeKind::Success);
        true
    }

    /// Persist `content` for `id`. On failure the document keeps its
    /// modified flag and an error notice is posted.
    async fn write_document(&mut self, id: DocumentId, path: &Path, content: &str) -> bool {
        match self.io.persistence.write_file(path, content).await {
            Ok(()) => {
                self.store.mark_saved(id, content);
                if self.store.active_id() == Some(id)
                    && !self.store.get(id).is_some_and(|d| d.is_modified())
                {
                    self.autosave.cancel();
                }
                self.refresh_documents();
                self.refresh_status();
                self.refresh_title();
                true
            }
            Err(e) => {
                self.notify(format!("Failed to save file: {}", e), NoticeKind::Error);
                false
            }
        }
    }

    pub async fn export_html(&mut self) -> bool {
        let Some(title) = self.store.active().map(|d| d.display_name().to_string()) else {
            self.notify("Nothing to export", NoticeKind::Warning);
            return false;
        };
        let stem = Path::new(&title)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| title.clone());

        let Some(path) = self
            .io
            .dialogs
            .choose_save_path(&format!("{}.html", stem))
            .await
        else {
            return false;
        };

        // Exported pages use the light stylesheet
        let body = self
            .preview
            .render_body(&self.store.surface().content(), Theme::Light);
        let page = export_document(&title, &body);
        match self.io.persistence.write_file(&path, &page).await {
            Ok(()) => {
                self.notify("HTML exported successfully", NoticeKind::Success);
                true
            }
            Err(e) => {
                self.notify(format!("Failed to export HTML: {}", e), NoticeKind::Error);
                false
            }
        }
    }

    // -- presentation ------------------------------------------------------

    pub async fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.prefs.set_theme(self.theme);
        if let Err(e) = self.prefs.flush().await {
            log::warn!("Failed to store theme preference: {}", e);
        }
        self.refresh_status();
        self.refresh_preview();
        self.theme
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.next();
        if self.view_mode == ViewMode::Preview {
            self.refresh_preview();
        }
        self.refresh_status();
        self.view_mode
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave.set_enabled(enabled);
        let state = if enabled { "enabled" } else { "disabled" };
        self.notify(format!("Autosave {}", state), NoticeKind::Info);
    }

    // -- links -------------------------------------------------------------

    pub async fn handle_link_click(&mut self, href: &str) -> Navigation {
        match classify(href) {
            LinkTarget::Empty => Navigation::Ignored,
            LinkTarget::Anchor(fragment) => self.scroll_to_fragment(&fragment),
            LinkTarget::External(url) => {
                self.io.browser.open(&url);
                Navigation::OpenedInBrowser(url)
            }
            LinkTarget::Unsupported(href) => {
                log::info!("Not following link: {}", href);
                Navigation::Ignored
            }
            LinkTarget::File { path, fragment } => {
                let Some(base) = self
                    .store
                    .active()
                    .and_then(|d| d.file_path())
                    .map(Path::to_path_buf)
                else {
                    self.notify(
                        "Cannot open linked file: current file path is unknown",
                        NoticeKind::Warning,
                    );
                    return Navigation::NoBasePath;
                };

                let target = resolve_relative(&base, &path);
                if !self.io.persistence.path_exists(&target).await {
                    self.notify(format!("File not found: {}", path), NoticeKind::Error);
                    return Navigation::FileNotFound(target);
                }

                match self.open_path(&target).await {
                    Some(id) => {
                        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
                            self.scroll_to_fragment(&fragment);
                        }
                        Navigation::OpenedFile(id)
                    }
                    None => Navigation::OpenFailed(target),
                }
            }
        }
    }

    fn scroll_to_fragment(&self, fragment: &str) -> Navigation {
        match resolve_anchor(fragment, &self.preview.anchors()) {
            Some(found) => {
                log::debug!("#{} resolved to {} ({:?})", fragment, found.id, found.strategy);
                self.io.preview.scroll_into_view(&found.id);
                self.io.preview.flash_highlight(&found.id, HIGHLIGHT_DURATION);
                Navigation::Scrolled(found)
            }
            None => {
                log::debug!("No element matches #{}", fragment);
                Navigation::AnchorNotFound(fragment.to_string())
            }
        }
    }

    // -- autosave ----------------------------------------------------------

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Called by the event loop when the autosave deadline may have passed.
    /// Returns true when the active document was written.
    pub async fn on_autosave_timer(&mut self, now: Instant) -> bool {
        if !self.autosave.take_expired(now) {
            return false;
        }
        self.autosave_active().await
    }

    /// Silently write the active document if it still needs it. Failures
    /// are logged and never shown.
    async fn autosave_active(&mut self) -> bool {
        self.store.update_active_content();
        let Some((id, path, content)) = self.store.active().and_then(|doc| {
            if !doc.needs_autosave() {
                return None;
            }
            let path = doc.file_path()?.to_path_buf();
            Some((doc.id(), path, doc.content().to_string()))
        }) else {
            return false;
        };

        match self.io.persistence.write_file(&path, &content).await {
            Ok(()) => {
                self.store.mark_saved(id, &content);
                log::info!("Autosaved {}", path.display());
                self.refresh_documents();
                self.refresh_status();
                self.refresh_title();
                true
            }
            Err(e) => {
                log::warn!("Autosave of {} failed: {}", path.display(), e);
                false
            }
        }
    }

    /// Teardown: one last best-effort save of the active document, then
    /// stop the timer.
    pub async fn shutdown(&mut self) -> bool {
        let saved = self.autosave.is_enabled() && self.autosave_active().await;
        self.autosave.cancel();
        if let Err(e) = self.prefs.flush().await {
            log::warn!("Failed to store preferences: {}", e);
        }
        log::info!("Workspace shut down (active document saved: {})", saved);
        saved
    }
}
