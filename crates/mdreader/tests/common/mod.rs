#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use mdreader::config::Config;
use mdreader::preferences::PreferenceStore;
use mdreader::preview::Preview;
use mdreader::status_manager::{Notice, NoticeKind};
use mdreader::{BrowserOpener, Chrome, Collaborators, Dialogs, Persistence, PreviewSurface, TabView, Workspace};

pub type EventLog = Arc<Mutex<Vec<String>>>;

fn log_event(events: &EventLog, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
    fail_writes: AtomicBool,
}

impl MemoryFs {
    pub fn insert(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Persistence for MemoryFs {
    async fn read_file(&self, path: &Path) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", path.display()))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Permission denied: {}", path.display()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn path_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.path_exists(path).await
    }
}

#[derive(Default)]
pub struct ScriptedDialogs {
    open_paths: Mutex<VecDeque<PathBuf>>,
    save_paths: Mutex<VecDeque<PathBuf>>,
    confirms: Mutex<VecDeque<bool>>,
    pub prompts: Mutex<Vec<String>>,
    pub suggestions: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn answer_open(&self, path: &str) {
        self.open_paths.lock().unwrap().push_back(PathBuf::from(path));
    }

    pub fn answer_save(&self, path: &str) {
        self.save_paths.lock().unwrap().push_back(PathBuf::from(path));
    }

    pub fn answer_confirm(&self, yes: bool) {
        self.confirms.lock().unwrap().push_back(yes);
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn choose_open_path(&self) -> Option<PathBuf> {
        self.open_paths.lock().unwrap().pop_front()
    }

    async fn choose_save_path(&self, suggested_name: &str) -> Option<PathBuf> {
        self.suggestions
            .lock()
            .unwrap()
            .push(suggested_name.to_string());
        self.save_paths.lock().unwrap().pop_front()
    }

    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.confirms.lock().unwrap().pop_front().unwrap_or(false)
    }
}

#[derive(Default)]
pub struct RecordingBrowser {
    pub opened: Mutex<Vec<String>>,
}

impl BrowserOpener for RecordingBrowser {
    fn open(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

pub struct RecordingPreview {
    events: EventLog,
    pub shown: Mutex<Vec<Preview>>,
    pub scrolled: Mutex<Vec<String>>,
    pub flashed: Mutex<Vec<(String, Duration)>>,
}

impl PreviewSurface for RecordingPreview {
    fn show(&self, preview: &Preview) {
        log_event(&self.events, "preview");
        self.shown.lock().unwrap().push(preview.clone());
    }

    fn scroll_into_view(&self, element_id: &str) {
        self.scrolled.lock().unwrap().push(element_id.to_string());
    }

    fn flash_highlight(&self, element_id: &str, duration: Duration) {
        self.flashed
            .lock()
            .unwrap()
            .push((element_id.to_string(), duration));
    }
}

pub struct RecordingChrome {
    events: EventLog,
    pub titles: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<String>>,
    pub tabs: Mutex<Vec<Vec<TabView>>>,
    pub notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingChrome {
    pub fn last_title(&self) -> Option<String> {
        self.titles.lock().unwrap().last().cloned()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn last_notice(&self) -> Option<(NoticeKind, String)> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Chrome for RecordingChrome {
    fn on_title_changed(&self, title: &str) {
        log_event(&self.events, "title");
        self.titles.lock().unwrap().push(title.to_string());
    }

    fn on_status_changed(&self, status: &str) {
        log_event(&self.events, "status");
        self.statuses.lock().unwrap().push(status.to_string());
    }

    fn on_documents_changed(&self, tabs: &[TabView]) {
        log_event(&self.events, "documents");
        self.tabs.lock().unwrap().push(tabs.to_vec());
    }

    fn on_notice(&self, notice: &Notice) {
        log_event(&self.events, "notice");
        self.notices
            .lock()
            .unwrap()
            .push((notice.kind, notice.content.clone()));
    }
}

/// Fakes for every collaborator, kept around for assertions.
pub struct Harness {
    pub fs: Arc<MemoryFs>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub browser: Arc<RecordingBrowser>,
    pub preview: Arc<RecordingPreview>,
    pub chrome: Arc<RecordingChrome>,
    pub events: EventLog,
}

impl Harness {
    pub fn new() -> Self {
        let events: EventLog = Arc::default();
        Self {
            fs: Arc::default(),
            dialogs: Arc::default(),
            browser: Arc::default(),
            preview: Arc::new(RecordingPreview {
                events: events.clone(),
                shown: Mutex::default(),
                scrolled: Mutex::default(),
                flashed: Mutex::default(),
            }),
            chrome: Arc::new(RecordingChrome {
                events: events.clone(),
                titles: Mutex::default(),
                statuses: Mutex::default(),
                tabs: Mutex::default(),
                notices: Mutex::default(),
            }),
            events,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            persistence: self.fs.clone(),
            dialogs: self.dialogs.clone(),
            browser: self.browser.clone(),
            preview: self.preview.clone(),
            chrome: self.chrome.clone(),
        }
    }

    pub fn workspace(&self) -> Workspace {
        self.workspace_with(&Config::default())
    }

    pub fn workspace_with(&self, config: &Config) -> Workspace {
        let mut workspace = Workspace::new(config, PreferenceStore::in_memory(), self.collaborators());
        workspace.on_editor_ready();
        self.clear_events();
        workspace
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn last_preview(&self) -> Option<Preview> {
        self.preview.shown.lock().unwrap().last().cloned()
    }
}
