use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::document::DocumentId;
use crate::navigator::Navigation;
use crate::shell::PathAnswers;
use crate::workspace::Workspace;

pub const HELP: &str = "\
Commands:
  new                    open an empty tab
  open [path]            open a file into the active tab
  switch <id>            activate a tab (e.g. tab-2 or 2)
  close [id] [!]         close a tab, ! skips the confirmation
  type <text>            type at the cursor (\\n for newline)
  backspace [n]          delete n characters before the cursor
  move <line> <col>      move the cursor (1-based)
  save                   save the active tab
  saveas [path]          save the active tab under a new name
  export [path]          export the active tab as HTML
  theme                  toggle dark/light
  view                   cycle split/editor/preview
  click <href>           follow a link in the preview
  drop <paths...>        open dropped files
  recent [n]             list recent files or open entry n
  tabs                   list open tabs
  preview                print the preview markup
  status                 print the status line
  autosave on|off        enable or disable autosave
  quit[!]                save what autosave can and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Open(Option<PathBuf>),
    Switch(DocumentId),
    Close { id: Option<DocumentId>, force: bool },
    Type(String),
    Backspace(usize),
    Move { line: usize, column: usize },
    Save,
    SaveAs(Option<PathBuf>),
    Export(Option<PathBuf>),
    Theme,
    View,
    Click(String),
    Drop(Vec<PathBuf>),
    Recent(Option<usize>),
    Tabs,
    Preview,
    Status,
    Autosave(bool),
    Help,
    Quit { force: bool },
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(None);
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (trimmed, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            "new" => Command::New,
            "open" | "e" => Command::Open(optional_path(rest)),
            "switch" | "sw" => {
                let id = args
                    .first()
                    .ok_or_else(|| anyhow::anyhow!("Argument required: tab id"))?;
                Command::Switch(parse_document_id(id)?)
            }
            "close" => {
                let mut id = None;
                let mut force = false;
                for arg in &args {
                    if *arg == "!" {
                        force = true;
                    } else {
                        id = Some(parse_document_id(arg)?);
                    }
                }
                Command::Close { id, force }
            }
            "close!" => Command::Close {
                id: args.first().map(|a| parse_document_id(a)).transpose()?,
                force: true,
            },
            "type" => {
                if rest.is_empty() {
                    return Err(anyhow::anyhow!("Argument required: text"));
                }
                Command::Type(unescape(rest))
            }
            "backspace" | "bs" => Command::Backspace(match args.first() {
                Some(n) => parse_number(n)?,
                None => 1,
            }),
            "move" => {
                if args.len() != 2 {
                    return Err(anyhow::anyhow!("Usage: move <line> <col>"));
                }
                Command::Move {
                    line: parse_number(args[0])?.saturating_sub(1),
                    column: parse_number(args[1])?.saturating_sub(1),
                }
            }
            "save" | "w" => Command::Save,
            "saveas" => Command::SaveAs(optional_path(rest)),
            "export" => Command::Export(optional_path(rest)),
            "theme" => Command::Theme,
            "view" => Command::View,
            "click" => {
                if rest.trim().is_empty() {
                    return Err(anyhow::anyhow!("Argument required: href"));
                }
                Command::Click(rest.trim().to_string())
            }
            "drop" => {
                if args.is_empty() {
                    return Err(anyhow::anyhow!("Argument required: paths"));
                }
                Command::Drop(args.iter().map(PathBuf::from).collect())
            }
            "recent" => Command::Recent(args.first().map(|n| parse_number(n)).transpose()?),
            "tabs" | "ls" => Command::Tabs,
            "preview" => Command::Preview,
            "status" => Command::Status,
            "autosave" => match args.first().copied() {
                Some("on") => Command::Autosave(true),
                Some("off") => Command::Autosave(false),
                _ => return Err(anyhow::anyhow!("Usage: autosave on|off")),
            },
            "help" | "?" => Command::Help,
            "quit" | "q" => Command::Quit {
                force: args.first() == Some(&"!"),
            },
            "quit!" | "q!" => Command::Quit { force: true },
            other => return Err(anyhow::anyhow!("Unknown command: {}", other)),
        };
        Ok(Some(command))
    }
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

fn parse_number(value: &str) -> Result<usize> {
    value
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("Not a number: {}", value))
}

fn parse_document_id(value: &str) -> Result<DocumentId> {
    let raw = value.strip_prefix("tab-").unwrap_or(value);
    raw.parse::<u64>()
        .map(DocumentId::new)
        .map_err(|_| anyhow::anyhow!("Not a tab id: {}", value))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Runs parsed commands against the workspace. Paths given on the command
/// line answer the file dialog that the command opens.
pub struct CommandProcessor {
    answers: Arc<PathAnswers>,
}

impl CommandProcessor {
    pub fn new(answers: Arc<PathAnswers>) -> Self {
        Self { answers }
    }

    pub async fn execute_command(
        &self,
        line: &str,
        workspace: &mut Workspace,
        should_quit: &mut bool,
    ) -> Result<String> {
        match Command::parse(line)? {
            Some(command) => self.execute(command, workspace, should_quit).await,
            None => Ok(String::new()),
        }
    }

    pub async fn execute(
        &self,
        command: Command,
        workspace: &mut Workspace,
        should_quit: &mut bool,
    ) -> Result<String> {
        match command {
            Command::New => {
                let id = workspace.new_tab();
                Ok(format!("Created {}", id))
            }
            Command::Open(path) => {
                if let Some(path) = path {
                    self.answers.push(path);
                }
                let opened = workspace.open().await;
                self.answers.clear();
                Ok(if opened {
                    active_summary(workspace)
                } else {
                    "Open cancelled".to_string()
                })
            }
            Command::Switch(id) => {
                if workspace.switch_to(id) {
                    Ok(active_summary(workspace))
                } else {
                    Err(anyhow::anyhow!("No such tab: {}", id))
                }
            }
            Command::Close { id, force } => {
                let id = id
                    .or_else(|| workspace.store().active_id())
                    .ok_or_else(|| anyhow::anyhow!("No tabs open"))?;
                if workspace.close_tab(id, force).await {
                    Ok(format!("Closed {}", id))
                } else {
                    Ok(format!("{} not closed", id))
                }
            }
            Command::Type(text) => {
                workspace.type_text(&text);
                Ok(String::new())
            }
            Command::Backspace(count) => {
                workspace.delete_backward(count);
                Ok(String::new())
            }
            Command::Move { line, column } => {
                workspace.move_cursor(line, column);
                Ok(String::new())
            }
            Command::Save => {
                let saved = workspace.save().await;
                self.answers.clear();
                Ok(if saved { String::new() } else { "Not saved".to_string() })
            }
            Command::SaveAs(path) => {
                if let Some(path) = path {
                    self.answers.push(path);
                }
                let saved = workspace.save_as().await;
                self.answers.clear();
                Ok(if saved { String::new() } else { "Not saved".to_string() })
            }
            Command::Export(path) => {
                if let Some(path) = path {
                    self.answers.push(path);
                }
                let exported = workspace.export_html().await;
                self.answers.clear();
                Ok(if exported { String::new() } else { "Not exported".to_string() })
            }
            Command::Theme => {
                let theme = workspace.toggle_theme().await;
                Ok(format!("Theme: {}", theme.label()))
            }
            Command::View => {
                let mode = workspace.toggle_view_mode();
                Ok(format!("View: {}", mode.label()))
            }
            Command::Click(href) => Ok(match workspace.handle_link_click(&href).await {
                Navigation::Scrolled(found) => format!("Scrolled to #{}", found.id),
                Navigation::AnchorNotFound(fragment) => format!("No element for #{}", fragment),
                Navigation::OpenedInBrowser(url) => format!("Opened {} in browser", url),
                Navigation::OpenedFile(_) => active_summary(workspace),
                Navigation::Ignored
                | Navigation::FileNotFound(_)
                | Navigation::NoBasePath
                | Navigation::OpenFailed(_) => String::new(),
            }),
            Command::Drop(paths) => {
                let opened = workspace.handle_dropped_paths(&paths).await;
                Ok(format!("Opened {} of {} dropped file(s)", opened.len(), paths.len()))
            }
            Command::Recent(None) => {
                let recent = workspace.preferences().recent_files();
                if recent.is_empty() {
                    return Ok("No recent files".to_string());
                }
                Ok(recent
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        format!(
                            "{:>2}. {} ({})",
                            i + 1,
                            entry.path.display(),
                            entry.opened_at.format("%Y-%m-%d %H:%M")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::Recent(Some(n)) => match n.checked_sub(1) {
                Some(index) => match workspace.open_recent(index).await {
                    Some(_) => Ok(active_summary(workspace)),
                    None => Ok(String::new()),
                },
                None => Err(anyhow::anyhow!("Recent entries start at 1")),
            },
            Command::Tabs => {
                let tabs = workspace.store().tab_views();
                if tabs.is_empty() {
                    return Ok("No tabs open".to_string());
                }
                Ok(tabs
                    .iter()
                    .map(|tab| {
                        format!(
                            "{} {} {}{}",
                            if tab.is_active { "*" } else { " " },
                            tab.id,
                            tab.title,
                            if tab.is_modified { " (modified)" } else { "" }
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::Preview => Ok(workspace
                .preview()
                .current()
                .map(|preview| preview.html.clone())
                .unwrap_or_default()),
            Command::Status => Ok(crate::status_manager::status_line(
                workspace.store(),
                workspace.theme(),
                workspace.view_mode(),
            )),
            Command::Autosave(enabled) => {
                workspace.set_autosave_enabled(enabled);
                Ok(String::new())
            }
            Command::Help => Ok(HELP.to_string()),
            Command::Quit { force } => {
                // Shutdown only autosaves the active document.
                let covered = workspace
                    .store()
                    .active()
                    .filter(|d| workspace.autosave().is_enabled() && !d.is_untitled())
                    .map(|d| d.id());
                let at_risk = workspace
                    .store()
                    .documents()
                    .iter()
                    .filter(|d| d.is_modified() && Some(d.id()) != covered)
                    .count();
                if at_risk > 0 && !force {
                    return Ok(format!(
                        "{} tab(s) have unsaved changes (use quit! to override)",
                        at_risk
                    ));
                }
                *should_quit = true;
                Ok("Quitting".to_string())
            }
        }
    }
}

fn active_summary(workspace: &Workspace) -> String {
    match workspace.store().active() {
        Some(doc) => format!("Active: {} {}", doc.id(), doc.display_name()),
        None => "No tabs open".to_string(),
    }
}
