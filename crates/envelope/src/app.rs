//! Application state and transitions
//!
//! The whole session is one owned [`App`] value. The event loop feeds it
//! [`Event`]s through [`App::update`], which hands back the new state plus the
//! [`Effect`]s the loop must carry out. Nothing in here does I/O.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use envelope_core::{env, EnvelopeError, ItemDetail, ListItem};
use tracing::{debug, info, warn};

use crate::input::TextInput;

/// File name used when the operator submits an empty name
pub const DEFAULT_FILE_NAME: &str = ".env";

/// What a `Loading` screen is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    Items,
    Detail,
    Write,
}

/// Which screen is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    VaultInput,
    Loading(Loading),
    ItemList,
    FileInput,
    Finished,
    Failed,
}

impl Screen {
    pub fn is_terminal(self) -> bool {
        matches!(self, Screen::Finished | Screen::Failed)
    }
}

/// Everything the state machine reacts to
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Spinner heartbeat from the loop
    Tick,
    /// End the session now, whatever is in flight
    Interrupt,
    ItemsLoaded(Vec<ListItem>),
    ItemLoaded(ItemDetail),
    FileWritten(PathBuf),
    Failed(EnvelopeError),
}

/// Asynchronous work for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListItems { vault: String },
    GetItem { id: String },
    WriteFile { path: PathBuf, content: String },
}

/// What the loop must do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Dispatch(Request),
    Quit,
}

/// How a session ended
#[derive(Debug)]
pub enum Outcome {
    Finished {
        vault: String,
        item: String,
        path: PathBuf,
    },
    Failed(EnvelopeError),
    Cancelled,
}

/// Application state
#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub vault_input: TextInput,
    pub file_input: TextInput,
    pub items: Vec<ListItem>,
    pub cursor: usize,
    pub selected_vault: Option<String>,
    pub selected_item: Option<ListItem>,
    /// Generated `.env` text waiting to be written
    pub env_content: String,
    pub final_path: Option<PathBuf>,
    pub error: Option<EnvelopeError>,
    pub cancelled: bool,
    pub spinner_frame: usize,
    working_dir: PathBuf,
}

impl App {
    /// `working_dir` is where the `.env` file will be written
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            screen: Screen::VaultInput,
            vault_input: TextInput::new("Personal"),
            file_input: TextInput::new(DEFAULT_FILE_NAME),
            items: Vec::new(),
            cursor: 0,
            selected_vault: None,
            selected_item: None,
            env_content: String::new(),
            final_path: None,
            error: None,
            cancelled: false,
            spinner_frame: 0,
            working_dir: working_dir.into(),
        }
    }

    pub fn with_vault(mut self, vault: &str) -> Self {
        self.vault_input = self.vault_input.with_value(vault);
        self
    }

    pub fn with_file_name(mut self, name: &str) -> Self {
        self.file_input = self.file_input.with_value(name);
        self
    }

    /// Whether the loop should stop
    pub fn should_quit(&self) -> bool {
        self.cancelled || self.screen.is_terminal()
    }

    /// Consume one event and return the next state with its effects
    pub fn update(mut self, event: Event) -> (Self, Vec<Effect>) {
        let effects = match event {
            Event::Interrupt => self.interrupt(),
            Event::Key(key) if is_interrupt(&key) => self.interrupt(),
            Event::Failed(err) => {
                warn!(screen = ?self.screen, error = %err, "session failed");
                self.screen = Screen::Failed;
                self.error = Some(err);
                vec![Effect::Quit]
            }
            Event::Tick => {
                if let Screen::Loading(_) = self.screen {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
                Vec::new()
            }
            Event::ItemsLoaded(items) => self.on_items_loaded(items),
            Event::ItemLoaded(detail) => self.on_item_loaded(&detail),
            Event::FileWritten(path) => self.on_file_written(path),
            Event::Key(key) => self.on_key(key),
        };

        (self, effects)
    }

    fn interrupt(&mut self) -> Vec<Effect> {
        info!(screen = ?self.screen, "session interrupted");
        self.cancelled = true;
        vec![Effect::Quit]
    }

    fn on_items_loaded(&mut self, items: Vec<ListItem>) -> Vec<Effect> {
        if self.screen != Screen::Loading(Loading::Items) {
            debug!(screen = ?self.screen, "ignoring unexpected item listing");
            return Vec::new();
        }
        debug!(count = items.len(), "items loaded");
        self.items = items;
        self.cursor = 0;
        self.screen = Screen::ItemList;
        Vec::new()
    }

    fn on_item_loaded(&mut self, detail: &ItemDetail) -> Vec<Effect> {
        if self.screen != Screen::Loading(Loading::Detail) {
            debug!(screen = ?self.screen, "ignoring unexpected item detail");
            return Vec::new();
        }
        self.env_content = env::generate(detail);
        debug!(item = %detail.id, bytes = self.env_content.len(), "generated env content");
        self.screen = Screen::FileInput;
        Vec::new()
    }

    fn on_file_written(&mut self, path: PathBuf) -> Vec<Effect> {
        if self.screen != Screen::Loading(Loading::Write) {
            debug!(screen = ?self.screen, "ignoring unexpected write completion");
            return Vec::new();
        }
        info!(path = %path.display(), "env file written");
        self.final_path = Some(path);
        self.screen = Screen::Finished;
        vec![Effect::Quit]
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match self.screen {
            Screen::VaultInput => self.on_vault_key(key),
            Screen::ItemList => self.on_list_key(key),
            Screen::FileInput => self.on_file_key(key),
            Screen::Loading(_) | Screen::Finished | Screen::Failed => Vec::new(),
        }
    }

    fn on_vault_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.code != KeyCode::Enter {
            self.vault_input.handle_key(key);
            return Vec::new();
        }

        let vault = self.vault_input.value().to_string();
        if vault.is_empty() {
            return Vec::new();
        }

        info!(vault = %vault, "listing items");
        self.selected_vault = Some(vault.clone());
        self.screen = Screen::Loading(Loading::Items);
        vec![Effect::Dispatch(Request::ListItems { vault })]
    }

    fn on_list_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
            KeyCode::Enter => {
                let Some(item) = self.items.get(self.cursor).cloned() else {
                    return Vec::new();
                };
                info!(item = %item.id, title = %item.title, "fetching item");
                let id = item.id.clone();
                self.selected_item = Some(item);
                self.screen = Screen::Loading(Loading::Detail);
                return vec![Effect::Dispatch(Request::GetItem { id })];
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_file_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.code != KeyCode::Enter {
            self.file_input.handle_key(key);
            return Vec::new();
        }

        let path = output_path(&self.working_dir, self.file_input.value());
        info!(path = %path.display(), "writing env file");
        self.screen = Screen::Loading(Loading::Write);
        vec![Effect::Dispatch(Request::WriteFile {
            path,
            content: self.env_content.clone(),
        })]
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Final result of the session
    pub fn into_outcome(self) -> Outcome {
        if let Some(err) = self.error {
            return Outcome::Failed(err);
        }
        match (self.screen, self.final_path) {
            (Screen::Finished, Some(path)) => Outcome::Finished {
                vault: self.selected_vault.unwrap_or_default(),
                item: self.selected_item.map(|i| i.title).unwrap_or_default(),
                path,
            },
            _ => Outcome::Cancelled,
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// `<dir>/<name>`, with `.env` for an empty name. The name is always taken
/// relative to `dir`.
pub fn output_path(dir: &Path, name: &str) -> PathBuf {
    let name = if name.is_empty() { DEFAULT_FILE_NAME } else { name };
    dir.join(name.trim_start_matches('/'))
}
