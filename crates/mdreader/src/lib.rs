// MD Reader library exports

pub mod autosave;
pub mod command_processor;
pub mod config;
pub mod document;
pub mod file_manager;
pub mod navigator;
pub mod paths;
pub mod platform;
pub mod preferences;
pub mod preview;
pub mod shell;
pub mod status_manager;
pub mod store;
pub mod surface;
pub mod workspace;

pub use autosave::AutosaveScheduler;
pub use config::{Config, Theme, ViewMode};
pub use document::{Document, DocumentId};
pub use platform::{BrowserOpener, Chrome, Collaborators, Dialogs, Persistence, PreviewSurface};
pub use store::{DocumentStore, TabView};
pub use surface::{ContentChange, EditOrigin, EditingSurface};
pub use workspace::Workspace;
