//! Seams to the outside world. The workspace only talks to the filesystem,
//! dialogs, the browser and the window through these traits, so it can be
//! driven headless and tested with fakes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::preview::Preview;
use crate::status_manager::Notice;
use crate::store::TabView;

#[async_trait]
pub trait Persistence: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn path_exists(&self, path: &Path) -> bool;
    async fn is_file(&self, path: &Path) -> bool;
}

/// Modal questions. `None` means the user cancelled.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn choose_open_path(&self) -> Option<PathBuf>;
    async fn choose_save_path(&self, suggested_name: &str) -> Option<PathBuf>;
    async fn confirm(&self, message: &str) -> bool;
}

pub trait BrowserOpener: Send + Sync {
    /// Fire and forget.
    fn open(&self, url: &str);
}

pub trait PreviewSurface: Send + Sync {
    fn show(&self, preview: &Preview);
    fn scroll_into_view(&self, element_id: &str);
    /// Briefly highlight an element; reverts on its own after `duration`.
    fn flash_highlight(&self, element_id: &str, duration: Duration);
}

/// Window decorations: title bar, status bar, tab strip.
pub trait Chrome: Send + Sync {
    fn on_title_changed(&self, title: &str);
    fn on_status_changed(&self, status: &str);
    fn on_documents_changed(&self, tabs: &[TabView]);
    fn on_notice(&self, notice: &Notice);
}

#[derive(Clone)]
pub struct Collaborators {
    pub persistence: Arc<dyn Persistence>,
    pub dialogs: Arc<dyn Dialogs>,
    pub browser: Arc<dyn BrowserOpener>,
    pub preview: Arc<dyn PreviewSurface>,
    pub chrome: Arc<dyn Chrome>,
}
