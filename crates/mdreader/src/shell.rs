//! Headless front end: reads commands from stdin, prints what a window would
//! show, and runs the autosave deadline in the same loop.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::command_processor::CommandProcessor;
use crate::platform::{BrowserOpener, Chrome, Collaborators, Dialogs, PreviewSurface};
use crate::file_manager::FileManager;
use crate::preview::{Preview, PreviewKind};
use crate::status_manager::{Notice, NoticeKind};
use crate::store::TabView;
use crate::workspace::Workspace;

pub type InputLines = Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>;

/// Paths supplied up front for the next file dialog(s).
#[derive(Debug, Default)]
pub struct PathAnswers {
    queue: Mutex<VecDeque<PathBuf>>,
}

impl PathAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, path: PathBuf) {
        self.lock().push_back(path);
    }

    pub fn pop(&self) -> Option<PathBuf> {
        self.lock().pop_front()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PathBuf>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Dialogs answered by queued paths or, failing that, by the next input line.
pub struct ConsoleDialogs {
    answers: Arc<PathAnswers>,
    input: InputLines,
}

impl ConsoleDialogs {
    pub fn new(answers: Arc<PathAnswers>, input: InputLines) -> Self {
        Self { answers, input }
    }

    async fn ask(&self, prompt: &str) -> Option<String> {
        println!("{}", prompt);
        let line = self.input.lock().await.recv().await?;
        let line = line.trim().to_string();
        (!line.is_empty()).then_some(line)
    }

    async fn ask_path(&self, prompt: &str) -> Option<PathBuf> {
        if let Some(path) = self.answers.pop() {
            return Some(path);
        }
        self.ask(prompt).await.map(PathBuf::from)
    }
}

#[async_trait]
impl Dialogs for ConsoleDialogs {
    async fn choose_open_path(&self) -> Option<PathBuf> {
        self.ask_path("Open file (empty line cancels):").await
    }

    async fn choose_save_path(&self, suggested_name: &str) -> Option<PathBuf> {
        self.ask_path(&format!("Save as [{}] (empty line cancels):", suggested_name))
            .await
    }

    async fn confirm(&self, message: &str) -> bool {
        match self.ask(&format!("{} [y/N]", message)).await {
            Some(answer) => matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleChrome;

impl Chrome for ConsoleChrome {
    fn on_title_changed(&self, title: &str) {
        println!("[title] {}", title);
    }

    fn on_status_changed(&self, status: &str) {
        log::debug!("[status] {}", status);
    }

    fn on_documents_changed(&self, tabs: &[TabView]) {
        let line = tabs
            .iter()
            .map(|tab| {
                format!(
                    "{}{}{}",
                    if tab.is_active { "*" } else { "" },
                    tab.title,
                    if tab.is_modified { " ●" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");
        println!("[tabs] {}", line);
    }

    fn on_notice(&self, notice: &Notice) {
        let label = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        };
        println!("[{}] {}", label, notice.content);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePreview;

impl PreviewSurface for ConsolePreview {
    fn show(&self, preview: &Preview) {
        match preview.kind {
            PreviewKind::Rendered => log::debug!("[preview] {} bytes", preview.html.len()),
            kind => log::debug!("[preview] {:?}", kind),
        }
    }

    fn scroll_into_view(&self, element_id: &str) {
        println!("[scroll] #{}", element_id);
    }

    fn flash_highlight(&self, element_id: &str, duration: Duration) {
        println!("[highlight] #{} for {}ms", element_id, duration.as_millis());
    }
}

/// Opens URLs with the desktop's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) {
        if let Err(e) = open::that_detached(url) {
            log::warn!("Failed to open {} in browser: {}", url, e);
        }
    }
}

/// Console collaborators sharing one input stream.
pub fn console_collaborators(answers: Arc<PathAnswers>, input: InputLines) -> Collaborators {
    Collaborators {
        persistence: Arc::new(FileManager::new()),
        dialogs: Arc::new(ConsoleDialogs::new(answers, input)),
        browser: Arc::new(SystemBrowser),
        preview: Arc::new(ConsolePreview),
        chrome: Arc::new(ConsoleChrome),
    }
}

/// Forward stdin lines into a channel until EOF.
pub fn spawn_stdin_reader() -> InputLines {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    Arc::new(tokio::sync::Mutex::new(rx))
}

async fn next_line(input: &InputLines) -> Option<String> {
    input.lock().await.recv().await
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Run commands until `quit` or end of input, then tear down.
pub async fn run_shell(
    workspace: &mut Workspace,
    processor: &CommandProcessor,
    input: InputLines,
) -> Result<()> {
    loop {
        workspace.tick();
        let deadline = workspace.autosave_deadline();

        tokio::select! {
            line = next_line(&input) => {
                let Some(line) = line else {
                    log::info!("End of input");
                    break;
                };
                let mut should_quit = false;
                match processor.execute_command(&line, workspace, &mut should_quit).await {
                    Ok(message) if !message.is_empty() => println!("{}", message),
                    Ok(_) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
                if should_quit {
                    break;
                }
            }
            _ = wait_for(deadline) => {
                workspace.on_autosave_timer(Instant::now()).await;
            }
        }
    }

    workspace.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    use crate::config::Config;
    use crate::platform::Persistence;
    use crate::preferences::PreferenceStore;

    #[derive(Default)]
    struct RecordingFs {
        files: Mutex<HashMap<PathBuf, String>>,
        writes: Mutex<Vec<(PathBuf, String)>>,
    }

    impl RecordingFs {
        fn writes(&self) -> Vec<(PathBuf, String)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Persistence for RecordingFs {
        async fn read_file(&self, path: &Path) -> Result<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("No such file: {}", path.display()))
        }

        async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            self.writes
                .lock()
                .unwrap()
                .push((path.to_path_buf(), content.to_string()));
            Ok(())
        }

        async fn path_exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }

        async fn is_file(&self, path: &Path) -> bool {
            self.path_exists(path).await
        }
    }

    fn input_with(lines: &[&str]) -> InputLines {
        let (tx, rx) = mpsc::channel(16);
        for line in lines {
            tx.try_send(line.to_string()).unwrap();
        }
        Arc::new(tokio::sync::Mutex::new(rx))
    }

    #[tokio::test]
    async fn test_queued_path_answers_dialog_first() {
        let answers = Arc::new(PathAnswers::new());
        answers.push(PathBuf::from("/tmp/queued.md"));
        let dialogs = ConsoleDialogs::new(answers.clone(), input_with(&["/tmp/typed.md"]));

        assert_eq!(dialogs.choose_open_path().await, Some(PathBuf::from("/tmp/queued.md")));
        assert_eq!(
            dialogs.choose_save_path("x.md").await,
            Some(PathBuf::from("/tmp/typed.md"))
        );
    }

    #[tokio::test]
    async fn test_confirm_reads_next_line() {
        let dialogs = ConsoleDialogs::new(
            Arc::new(PathAnswers::new()),
            input_with(&["Y", "no", ""]),
        );
        assert!(dialogs.confirm("Sure?").await);
        assert!(!dialogs.confirm("Sure?").await);
        assert!(!dialogs.confirm("Sure?").await);
    }

    #[tokio::test]
    async fn test_empty_line_cancels_and_eof_cancels() {
        let (tx, rx) = mpsc::channel(4);
        tx.try_send(String::new()).unwrap();
        drop(tx);
        let dialogs = ConsoleDialogs::new(Arc::new(PathAnswers::new()), Arc::new(tokio::sync::Mutex::new(rx)));
        assert!(dialogs.choose_open_path().await.is_none());
        assert!(dialogs.choose_open_path().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shell_loop_fires_autosave_and_saves_on_eof() {
        let fs = Arc::new(RecordingFs::default());
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/docs/a.md"), "a".to_string());

        let answers = Arc::new(PathAnswers::new());
        let (tx, rx) = mpsc::channel(16);
        let input: InputLines = Arc::new(tokio::sync::Mutex::new(rx));
        let io = Collaborators {
            persistence: fs.clone(),
            dialogs: Arc::new(ConsoleDialogs::new(answers.clone(), input.clone())),
            browser: Arc::new(SystemBrowser),
            preview: Arc::new(ConsolePreview),
            chrome: Arc::new(ConsoleChrome),
        };
        let mut ws = Workspace::new(&Config::default(), PreferenceStore::in_memory(), io);
        ws.on_editor_ready();
        ws.open_path(Path::new("/docs/a.md")).await.unwrap();
        let processor = CommandProcessor::new(answers);

        let driver = {
            let fs = fs.clone();
            async move {
                tx.send("type x".to_string()).await.unwrap();
                // The loop's 30s deadline passes before this wakes up.
                tokio::time::sleep(Duration::from_secs(31)).await;
                assert_eq!(
                    fs.writes(),
                    vec![(PathBuf::from("/docs/a.md"), "xa".to_string())]
                );
                tx.send("type y".to_string()).await.unwrap();
            }
        };

        let (result, ()) = tokio::join!(run_shell(&mut ws, &processor, input), driver);
        result.unwrap();

        // End of input runs the teardown save.
        assert_eq!(
            fs.writes(),
            vec![
                (PathBuf::from("/docs/a.md"), "xa".to_string()),
                (PathBuf::from("/docs/a.md"), "xya".to_string()),
            ]
        );
        assert!(ws.autosave_deadline().is_none());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!ws.on_autosave_timer(Instant::now()).await);
        assert_eq!(fs.writes().len(), 2);
    }
}
