use std::time::Duration;
use tokio::time::Instant;

use crate::config::{Theme, ViewMode};
use crate::store::DocumentStore;

pub const APP_TITLE: &str = "MD Reader";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message for the status area. Notices never block.
#[derive(Debug, Clone)]
pub struct Notice {
    pub content: String,
    pub kind: NoticeKind,
    pub created_at: Instant,
    pub auto_clear_duration: Option<Duration>,
}

impl Notice {
    pub fn new(content: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            content: content.into(),
            kind,
            created_at: Instant::now(),
            auto_clear_duration: Self::default_duration_for_kind(kind),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.auto_clear_duration {
            Some(duration) => now.duration_since(self.created_at) > duration,
            None => false,
        }
    }

    fn default_duration_for_kind(kind: NoticeKind) -> Option<Duration> {
        match kind {
            NoticeKind::Info => Some(Duration::from_secs(3)),
            NoticeKind::Success => Some(Duration::from_secs(2)),
            NoticeKind::Warning => Some(Duration::from_secs(5)),
            NoticeKind::Error => Some(Duration::from_secs(7)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current: Option<Notice>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Replace the current notice and return it for forwarding to the chrome.
    pub fn post(&mut self, content: impl Into<String>, kind: NoticeKind) -> &Notice {
        let notice = Notice::new(content, kind);
        match kind {
            NoticeKind::Error => log::error!("{}", notice.content),
            NoticeKind::Warning => log::warn!("{}", notice.content),
            NoticeKind::Info | NoticeKind::Success => log::info!("{}", notice.content),
        }
        self.current.insert(notice)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the current notice once it has expired.
    pub fn update(&mut self) {
        if self.current.as_ref().is_some_and(Notice::is_expired) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn has_notice(&self) -> bool {
        self.current.is_some()
    }
}

/// One-line summary of the active document for the status bar.
pub fn status_line(store: &DocumentStore, theme: Theme, view_mode: ViewMode) -> String {
    let Some(doc) = store.active() else {
        return format!("No tabs open - {} - Ready", theme.label());
    };
    let surface = store.surface();
    let cursor = surface.cursor_position();
    format!(
        "{} - Line {}, Col {} - Words: {} - Chars: {} - {} - {} - {}",
        doc.display_name(),
        cursor.line + 1,
        cursor.column + 1,
        surface.word_count(),
        surface.char_count(),
        theme.label(),
        if doc.is_modified() { "Modified" } else { "Saved" },
        view_mode.label()
    )
}

pub fn window_title(store: &DocumentStore) -> String {
    match store.active() {
        Some(doc) if doc.is_modified() => format!("● {} - {}", doc.display_name(), APP_TITLE),
        Some(doc) => format!("{} - {}", doc.display_name(), APP_TITLE),
        None => APP_TITLE.to_string(),
    }
}
