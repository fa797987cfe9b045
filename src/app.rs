use crate::{
    bridge::{parse_optional_payload, parse_payload, QueryBridge, Request},
    filters::{self, Filters},
    game::{ConflictReport, Game, GameData, MasterlistUpdate, Message, SortResult},
    metadata::{DerivedMetadata, PluginEdits, UserMetadata},
    settings::{Settings, SettingsDraft},
};
use anyhow::{bail, Context, Result};
use arboard::Clipboard;
use serde_json::json;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const LOG_CAPACITY: usize = 200;
const CYCLE_MESSAGE_PREFIX: &str = "Cyclic interaction detected";

/// Where this process writes its own logs; the backend keeps its logs
/// wherever it pleases.
pub fn log_directory() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.data_local_dir().join("loadwright"))
}

/// Exactly one UI mode is active at a time; mode transitions gate which
/// commands are enabled, which is what keeps conflicting backend call
/// chains from being user-triggered concurrently.
#[derive(Debug, Clone, PartialEq)]
pub enum UiMode {
    Normal,
    Sorting,
    Editor(EditorSession),
}

/// Modal editing sub-state for one plugin's user metadata. The draft is the
/// candidate userlist; nothing is committed until the session is closed
/// with apply.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    pub plugin: String,
    pub draft: UserMetadata,
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorRow {
    Enabled,
    Priority,
    PriorityGlobal,
    LoadAfter,
    Requirements,
    Incompatibilities,
    Messages,
    Tags,
    DirtyInfo,
}

pub const EDITOR_ROWS: &[EditorRow] = &[
    EditorRow::Enabled,
    EditorRow::Priority,
    EditorRow::PriorityGlobal,
    EditorRow::LoadAfter,
    EditorRow::Requirements,
    EditorRow::Incompatibilities,
    EditorRow::Messages,
    EditorRow::Tags,
    EditorRow::DirtyInfo,
];

impl EditorSession {
    pub fn selected_row(&self) -> EditorRow {
        EDITOR_ROWS[self.selected.min(EDITOR_ROWS.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % EDITOR_ROWS.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(EDITOR_ROWS.len() - 1);
    }

    pub fn adjust_selected(&mut self, delta: i32) {
        match self.selected_row() {
            EditorRow::Enabled => self.draft.enabled = !self.draft.enabled,
            EditorRow::Priority => {
                self.draft.priority = self.draft.priority.saturating_add(delta);
            }
            EditorRow::PriorityGlobal => {
                self.draft.is_priority_global = !self.draft.is_priority_global;
            }
            // The list-valued rows are display-only in this panel; they
            // still round-trip through the draft untouched.
            EditorRow::LoadAfter
            | EditorRow::Requirements
            | EditorRow::Incompatibilities
            | EditorRow::Messages
            | EditorRow::Tags
            | EditorRow::DirtyInfo => {}
        }
    }

    pub fn row_label(row: EditorRow) -> &'static str {
        match row {
            EditorRow::Enabled => "Enabled",
            EditorRow::Priority => "Priority",
            EditorRow::PriorityGlobal => "Global priority",
            EditorRow::LoadAfter => "Load after",
            EditorRow::Requirements => "Requirements",
            EditorRow::Incompatibilities => "Incompatibilities",
            EditorRow::Messages => "Messages",
            EditorRow::Tags => "Tags",
            EditorRow::DirtyInfo => "Dirty info",
        }
    }

    pub fn row_value(&self, row: EditorRow) -> String {
        fn yes_no(value: bool) -> String {
            let label = if value { "yes" } else { "no" };
            label.to_string()
        }
        fn file_list(values: &[String]) -> String {
            if values.is_empty() {
                "none".to_string()
            } else {
                values.join(", ")
            }
        }
        fn entry_count(len: usize) -> String {
            match len {
                0 => "none".to_string(),
                1 => "1 entry".to_string(),
                n => format!("{n} entries"),
            }
        }
        match row {
            EditorRow::Enabled => yes_no(self.draft.enabled),
            EditorRow::Priority => self.draft.priority.to_string(),
            EditorRow::PriorityGlobal => yes_no(self.draft.is_priority_global),
            EditorRow::LoadAfter => file_list(&self.draft.load_after),
            EditorRow::Requirements => file_list(&self.draft.requirements),
            EditorRow::Incompatibilities => file_list(&self.draft.incompatibilities),
            EditorRow::Messages => entry_count(self.draft.messages.len()),
            EditorRow::Tags => entry_count(self.draft.tags.len()),
            EditorRow::DirtyInfo => entry_count(self.draft.dirty_info.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    ChangeGame,
    RefreshContent,
    UpdateMasterlist,
    SortPlugins,
    ApplySort,
    CancelSort,
    OpenEditor,
    CloseEditor,
    ClearPluginMetadata,
    ClearAllMetadata,
    RedatePlugins,
    CopyContent,
    CopyLoadOrder,
    CopyMetadata,
    OpenSettings,
    OpenReadme,
    OpenLogLocation,
    ToggleFilters,
    ConflictsFilter,
    Search,
    Quit,
}

/// Which toolbar affordances the renderer shows, derived purely from the
/// mode. Entering Sorting swaps update/sort for apply/cancel and locks the
/// game menu; leaving reverses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolbar {
    pub show_update_masterlist: bool,
    pub show_sort: bool,
    pub show_apply_sort: bool,
    pub show_cancel_sort: bool,
    pub game_menu_enabled: bool,
}

impl Toolbar {
    pub fn for_mode(mode: &UiMode) -> Self {
        match mode {
            UiMode::Normal => Self {
                show_update_masterlist: true,
                show_sort: true,
                show_apply_sort: false,
                show_cancel_sort: false,
                game_menu_enabled: true,
            },
            UiMode::Sorting => Self {
                show_update_masterlist: false,
                show_sort: false,
                show_apply_sort: true,
                show_cancel_sort: true,
                game_menu_enabled: false,
            },
            UiMode::Editor(_) => Self {
                show_update_masterlist: true,
                show_sort: true,
                show_apply_sort: false,
                show_cancel_sort: false,
                game_menu_enabled: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogKind {
    ClearPluginMetadata { plugin: String },
    ClearAllMetadata,
    RedatePlugins,
    QuitWithUnapplied { change: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub yes_label: String,
    pub no_label: String,
    pub choice: DialogChoice,
    pub kind: DialogKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub open: bool,
    pub needle: String,
    pub results: Vec<usize>,
    pub selected: usize,
}

impl SearchState {
    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1) % self.results.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.results.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.results.len() - 1);
        }
    }

    pub fn current_result(&self) -> Option<usize> {
        self.results.get(self.selected).copied()
    }
}

pub struct App {
    pub bridge: Box<dyn QueryBridge>,
    pub game: Game,
    pub installed_games: Vec<String>,
    pub settings: Settings,
    pub filters: Filters,
    pub mode: UiMode,
    pub visible: Vec<usize>,
    pub selected: usize,
    pub search: SearchState,
    pub settings_draft: Option<SettingsDraft>,
    pub show_filter_panel: bool,
    pub filter_panel_selected: usize,
    pub dialog: Option<Dialog>,
    pub status: String,
    pub log: Vec<LogEntry>,
    pub toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    pub fn new(bridge: Box<dyn QueryBridge>, game: Game, settings: Settings) -> Self {
        let filters = settings.filters.clone();
        let visible = filters::visible_plugins(&game.plugins, &filters);
        Self {
            bridge,
            game,
            installed_games: Vec::new(),
            settings,
            filters,
            mode: UiMode::Normal,
            visible,
            selected: 0,
            search: SearchState::default(),
            settings_draft: None,
            show_filter_panel: false,
            filter_panel_selected: 0,
            dialog: None,
            status: "Ready".to_string(),
            log: Vec::new(),
            toast: None,
            should_quit: false,
        }
    }

    pub fn initialize(mut bridge: Box<dyn QueryBridge>) -> Result<Self> {
        let payload = bridge.query(Request::GetSettings)?;
        let settings: Settings = parse_payload("getSettings", payload)?;
        let payload = bridge.query(Request::GetGameData)?;
        let data: GameData = parse_payload("getGameData", payload)?;
        let mut app = Self::new(bridge, Game::from_data(data), settings);
        app.set_status(format!(
            "Loaded {} plugins for {}",
            app.game.plugins.len(),
            app.settings.game_name(&app.game.folder.clone())
        ));
        Ok(app)
    }

    pub fn tick(&mut self) {
        if let Some(toast) = &self.toast {
            if Instant::now() >= toast.expires_at {
                self.toast = None;
            }
        }
    }

    pub fn toolbar(&self) -> Toolbar {
        Toolbar::for_mode(&self.mode)
    }

    pub fn command_enabled(&self, command: AppCommand) -> bool {
        match self.mode {
            UiMode::Normal => !matches!(command, AppCommand::ApplySort | AppCommand::CancelSort | AppCommand::CloseEditor),
            UiMode::Sorting => matches!(
                command,
                AppCommand::ApplySort
                    | AppCommand::CancelSort
                    | AppCommand::ToggleFilters
                    | AppCommand::Search
                    | AppCommand::CopyContent
                    | AppCommand::CopyLoadOrder
                    | AppCommand::Quit
            ),
            UiMode::Editor(_) => {
                matches!(
                    command,
                    AppCommand::CloseEditor | AppCommand::Search | AppCommand::Quit
                )
            }
        }
    }

    pub fn sidebar_draggable(&self) -> bool {
        matches!(self.mode, UiMode::Editor(_))
    }

    pub fn selected_plugin_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    pub fn selected_plugin_name(&self) -> Option<String> {
        self.selected_plugin_index()
            .and_then(|index| self.game.plugins.get(index))
            .map(|plugin| plugin.name.clone())
    }

    pub fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    pub fn refilter(&mut self) {
        self.visible = filters::visible_plugins(&self.game.plugins, &self.filters);
        self.clamp_selection();
    }

    // ---- status / log / toast plumbing -------------------------------

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn set_toast(&mut self, message: &str, level: ToastLevel, duration: Duration) {
        self.toast = Some(Toast {
            message: message.to_string(),
            level,
            expires_at: Instant::now() + duration,
        });
    }

    pub fn log_info(&mut self, message: String) {
        tracing::info!("{message}");
        self.push_log(LogLevel::Info, message);
    }

    pub fn log_error(&mut self, message: String) {
        tracing::error!("{message}");
        self.push_log(LogLevel::Error, message);
    }

    fn push_log(&mut self, level: LogLevel, message: String) {
        self.log.push(LogEntry { level, message });
        if self.log.len() > LOG_CAPACITY {
            let drop = self.log.len() - LOG_CAPACITY;
            self.log.drain(..drop);
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.set_status(message.clone());
        self.set_toast(&message, ToastLevel::Info, Duration::from_secs(3));
        self.log_info(message);
    }

    /// Single funnel for failed command handlers: every backend-call
    /// failure ends up here as a user-visible notification.
    fn handle_failure(&mut self, action: &str, err: &anyhow::Error) {
        let message = format!("{action} failed: {err}");
        self.set_status(message.clone());
        self.set_toast(&message, ToastLevel::Error, Duration::from_secs(4));
        self.log_error(message);
    }

    pub fn finish(&mut self, action: &str, result: Result<()>) {
        if let Err(err) = result {
            self.handle_failure(action, &err);
        }
    }

    // ---- dialogs -----------------------------------------------------

    pub fn open_dialog(&mut self, dialog: Dialog) {
        if self.dialog.is_none() {
            self.dialog = Some(dialog);
        }
    }

    pub fn dialog_toggle_choice(&mut self) {
        if let Some(dialog) = &mut self.dialog {
            dialog.choice = match dialog.choice {
                DialogChoice::Yes => DialogChoice::No,
                DialogChoice::No => DialogChoice::Yes,
            };
        }
    }

    pub fn dialog_cancel(&mut self) {
        self.dialog = None;
    }

    pub fn dialog_confirm(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        if dialog.choice != DialogChoice::Yes {
            return;
        }
        match dialog.kind {
            DialogKind::ClearPluginMetadata { plugin } => {
                let result = self.perform_clear_plugin_metadata(&plugin);
                self.finish("Clear plugin metadata", result);
            }
            DialogKind::ClearAllMetadata => {
                let result = self.perform_clear_all_metadata();
                self.finish("Clear all metadata", result);
            }
            DialogKind::RedatePlugins => {
                let result = self.perform_redate_plugins();
                self.finish("Redate plugins", result);
            }
            DialogKind::QuitWithUnapplied { .. } => {
                let result = self.perform_quit_discarding_changes();
                self.finish("Quit", result);
            }
        }
    }

    // ---- game switch / refresh ---------------------------------------

    pub fn change_game(&mut self, folder: &str) -> Result<()> {
        if !self.command_enabled(AppCommand::ChangeGame) {
            return Ok(());
        }
        if folder == self.game.folder {
            return Ok(());
        }
        let payload = self.bridge.query(Request::ChangeGame {
            folder: folder.to_string(),
        })?;
        let data: GameData = parse_payload("changeGame", payload)?;
        // The conflicts filter targets a plugin of the old game; reset its
        // value without touching the other filters.
        self.filters.conflict_target_plugin_name = None;
        self.game = Game::from_data(data);
        self.selected = 0;
        self.rerun_search();
        self.refilter();
        self.set_status(format!(
            "Loaded game data for {}",
            self.settings.game_name(&self.game.folder.clone())
        ));
        Ok(())
    }

    pub fn change_to_next_game(&mut self) -> Result<()> {
        if self.installed_games.is_empty() && self.settings.games.is_empty() {
            return Ok(());
        }
        let folders: Vec<String> = if self.installed_games.is_empty() {
            self.settings.games.iter().map(|g| g.folder.clone()).collect()
        } else {
            self.installed_games.clone()
        };
        let current = folders.iter().position(|f| *f == self.game.folder);
        let next = match current {
            Some(index) => folders[(index + 1) % folders.len()].clone(),
            None => folders[0].clone(),
        };
        self.change_game(&next)
    }

    pub fn refresh_content(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::RefreshContent) {
            return Ok(());
        }
        let payload = self.bridge.query(Request::GetGameData)?;
        let data: GameData = parse_payload("getGameData", payload)?;
        self.game = Game::from_data(data);
        self.rerun_search();
        self.refilter();
        self.set_status("Content refreshed".to_string());
        Ok(())
    }

    // ---- masterlist update / sort workflow ---------------------------

    pub fn update_masterlist(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::UpdateMasterlist) {
            return Ok(());
        }
        self.perform_masterlist_update()
    }

    fn perform_masterlist_update(&mut self) -> Result<()> {
        let payload = self.bridge.query(Request::UpdateMasterlist)?;
        let update: Option<MasterlistUpdate> =
            parse_optional_payload("updateMasterlist", payload)?;
        match update {
            Some(update) => {
                let revision = update.masterlist.revision.clone();
                self.game.apply_masterlist_update(update);
                self.notify(format!("Masterlist updated to revision {revision}."));
            }
            None => self.notify("No masterlist update was necessary."),
        }
        Ok(())
    }

    pub fn sort_plugins(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::SortPlugins) {
            return Ok(());
        }
        if self.undo_conflicts_filter() {
            self.refilter();
        }
        if self.settings.update_masterlist {
            // A masterlist that cannot be fetched is surfaced but does not
            // block sorting against the copy already on disk.
            if let Err(err) = self.perform_masterlist_update() {
                self.handle_failure("Update masterlist", &err);
            }
        }

        let payload = self.bridge.query(Request::SortPlugins)?;
        let result: SortResult = parse_payload("sortPlugins", payload)?;
        self.game.global_messages = result.global_messages;

        let Some(sorted) = result.plugins else {
            // The backend could not produce an order; the cycle (if any) is
            // named in a global message. Nothing else was committed.
            let detail = self
                .game
                .global_messages
                .iter()
                .find(|message| message.text.starts_with(CYCLE_MESSAGE_PREFIX))
                .map(|message| message.text.clone())
                .unwrap_or_else(|| "the backend returned no sorted order".to_string());
            bail!("Failed to sort plugins. Details: {detail}");
        };

        if self.game.order_matches(&sorted) {
            self.game.absorb_sorted_fields(&sorted);
            // The backend still holds the proposed order as pending; tell it
            // to let go or it will refuse to shut down cleanly.
            self.bridge.query(Request::DiscardUnappliedChanges)?;
            self.notify("Sorting made no changes to the load order.");
            return Ok(());
        }

        let previous = std::mem::take(&mut self.game.plugins);
        let proposed = {
            let snapshot = Game {
                plugins: previous.clone(),
                ..Game::default()
            };
            snapshot.reconcile_sorted(&sorted)
        };
        self.game.old_load_order = Some(previous);
        self.game.load_order = Some(sorted.iter().map(|entry| entry.name.clone()).collect());
        self.game.plugins = proposed;
        self.mode = UiMode::Sorting;
        self.refilter();
        self.set_status("Load order sorted. Apply or cancel to continue.");
        Ok(())
    }

    pub fn apply_sort(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::ApplySort) {
            return Ok(());
        }
        let load_order = self.game.plugin_names();
        self.bridge.query(Request::ApplySort { load_order })?;
        self.game.old_load_order = None;
        self.game.load_order = None;
        self.mode = UiMode::Normal;
        self.notify("Load order applied.");
        Ok(())
    }

    pub fn cancel_sort(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::CancelSort) {
            return Ok(());
        }
        let payload = self.bridge.query(Request::CancelSort)?;
        let messages: Vec<Message> = parse_payload("cancelSort", payload)?;
        if let Some(previous) = self.game.old_load_order.take() {
            self.game.plugins = previous;
        }
        self.game.load_order = None;
        self.game.global_messages = messages;
        self.mode = UiMode::Normal;
        self.refilter();
        self.notify("Sort cancelled.");
        Ok(())
    }

    // ---- metadata clears / redate ------------------------------------

    pub fn prompt_clear_plugin_metadata(&mut self) {
        if !self.command_enabled(AppCommand::ClearPluginMetadata) {
            return;
        }
        let Some(plugin) = self.selected_plugin_name() else {
            return;
        };
        self.open_dialog(Dialog {
            title: "Clear plugin metadata?".to_string(),
            message: format!(
                "Are you sure you want to clear all existing user-added metadata from \"{plugin}\"?"
            ),
            yes_label: "Clear".to_string(),
            no_label: "Cancel".to_string(),
            choice: DialogChoice::No,
            kind: DialogKind::ClearPluginMetadata { plugin },
        });
    }

    fn perform_clear_plugin_metadata(&mut self, name: &str) -> Result<()> {
        let payload = self.bridge.query(Request::ClearPluginMetadata {
            plugin: name.to_string(),
        })?;
        let derived: DerivedMetadata = parse_payload("clearPluginMetadata", payload)?;
        if let Some(plugin) = self.game.find_plugin_mut(name) {
            plugin.userlist = None;
            derived.merge_into(plugin);
        }
        self.notify(format!(
            "The user-added metadata for \"{name}\" has been cleared."
        ));
        self.rerun_search();
        Ok(())
    }

    pub fn prompt_clear_all_metadata(&mut self) {
        if !self.command_enabled(AppCommand::ClearAllMetadata) {
            return;
        }
        self.open_dialog(Dialog {
            title: "Clear all metadata?".to_string(),
            message: "Are you sure you want to clear all existing user-added metadata from all \
                      plugins?"
                .to_string(),
            yes_label: "Clear".to_string(),
            no_label: "Cancel".to_string(),
            choice: DialogChoice::No,
            kind: DialogKind::ClearAllMetadata,
        });
    }

    fn perform_clear_all_metadata(&mut self) -> Result<()> {
        let payload = self.bridge.query(Request::ClearAllMetadata)?;
        let cleared: Vec<DerivedMetadata> = parse_payload("clearAllMetadata", payload)?;
        for derived in &cleared {
            if let Some(plugin) = self.game.find_plugin_mut(&derived.name) {
                plugin.userlist = None;
                derived.merge_into(plugin);
            }
        }
        self.notify("All user-added metadata has been cleared.");
        self.rerun_search();
        Ok(())
    }

    pub fn prompt_redate_plugins(&mut self) {
        if !self.command_enabled(AppCommand::RedatePlugins) {
            return;
        }
        self.open_dialog(Dialog {
            title: "Redate Plugins?".to_string(),
            message: "This feature is provided so that modders using the Creation Kit may set \
                      the load order it uses. A side-effect is that any subscribed Steam \
                      Workshop mods will be re-downloaded by Steam. Do you wish to continue?"
                .to_string(),
            yes_label: "Redate".to_string(),
            no_label: "Cancel".to_string(),
            choice: DialogChoice::No,
            kind: DialogKind::RedatePlugins,
        });
    }

    fn perform_redate_plugins(&mut self) -> Result<()> {
        self.bridge.query(Request::RedatePlugins)?;
        self.notify("Plugins were successfully redated.");
        Ok(())
    }

    // ---- editor session ----------------------------------------------

    pub fn open_editor(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::OpenEditor) {
            return Ok(());
        }
        let Some(index) = self.selected_plugin_index() else {
            return Ok(());
        };
        let plugin = &self.game.plugins[index];
        let name = plugin.name.clone();
        let draft = plugin.userlist.clone().unwrap_or_default();
        self.mode = UiMode::Editor(EditorSession {
            plugin: name.clone(),
            draft,
            selected: 0,
        });
        self.bridge.query(Request::EditorOpened)?;
        self.set_status(format!("Editing metadata for {name}"));
        Ok(())
    }

    /// Close the editor session. Apply sends the draft to the backend and,
    /// on a non-empty reply, overwrites the plugin's derived fields while
    /// keeping the raw userlist locally; cancel just notifies the backend.
    /// Both paths leave the mode and toolbar in the same place.
    pub fn close_editor(&mut self, apply: bool) -> Result<()> {
        let UiMode::Editor(session) = std::mem::replace(&mut self.mode, UiMode::Normal) else {
            return Ok(());
        };
        if apply {
            let edits = PluginEdits {
                name: session.plugin.clone(),
                userlist: session.draft.clone(),
            };
            let payload = self.bridge.query(Request::EditorClosed { edits: Some(edits) })?;
            let derived: Option<DerivedMetadata> =
                parse_optional_payload("editorClosed", payload)?;
            if let Some(derived) = derived {
                if let Some(plugin) = self.game.find_plugin_mut(&session.plugin) {
                    derived.merge_into(plugin);
                    plugin.userlist = Some(session.draft);
                }
                // An edit can change which plugins a search matches.
                self.rerun_search();
            }
            self.set_status(format!("Saved metadata for {}", session.plugin));
        } else {
            self.bridge.query(Request::EditorClosed { edits: None })?;
            self.set_status(format!("Discarded metadata edits for {}", session.plugin));
        }
        Ok(())
    }

    // ---- filters / search --------------------------------------------

    pub fn toggle_filter(&mut self, id: &str) -> Result<()> {
        if !self.command_enabled(AppCommand::ToggleFilters) {
            return Ok(());
        }
        let Some(current) = self.filters.get(id) else {
            return Ok(());
        };
        let enabled = !current;
        self.filters.set(id, enabled);
        self.settings.filters.set(id, enabled);
        let saved = self.bridge.query(Request::SaveFilterState {
            filter: id.to_string(),
            enabled,
        });
        self.refilter();
        saved?;
        Ok(())
    }

    pub fn set_content_filter(&mut self, text: &str) {
        self.filters.content_search_string = text.to_string();
        self.refilter();
    }

    pub fn undo_conflicts_filter(&mut self) -> bool {
        let was_enabled = self.filters.conflict_target_plugin_name.is_some();
        self.filters.conflict_target_plugin_name = None;
        self.game.clear_conflict_flags();
        was_enabled
    }

    /// Toggle conflict filtering against the selected plugin. Single
    /// target: activating it on one plugin clears any previous target
    /// first, deactivating clears the target entirely.
    pub fn toggle_conflicts_filter(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::ConflictsFilter) {
            return Ok(());
        }
        let Some(target) = self.selected_plugin_name() else {
            return Ok(());
        };
        let activating =
            self.filters.conflict_target_plugin_name.as_deref() != Some(target.as_str());
        self.undo_conflicts_filter();
        if activating {
            let payload = self.bridge.query(Request::GetConflictingPlugins {
                plugin: target.clone(),
            })?;
            let report: ConflictReport = parse_payload("getConflictingPlugins", payload)?;
            if !report.general_messages.is_empty() {
                self.game.global_messages = report.general_messages;
            }
            for entry in &report.plugins {
                if entry.conflicts {
                    if let Some(plugin) = self.game.find_plugin_mut(&entry.metadata.name) {
                        plugin.conflicts_with_target = true;
                    }
                }
            }
            if let Some(plugin) = self.game.find_plugin_mut(&target) {
                plugin.is_conflict_filter_target = true;
            }
            self.filters.conflict_target_plugin_name = Some(target);
        }
        self.refilter();
        Ok(())
    }

    pub fn begin_search(&mut self, needle: &str) {
        self.search.needle = needle.to_string();
        self.search.results = filters::run_search(&mut self.game.plugins, &self.filters, needle);
        self.search.selected = 0;
    }

    /// Re-run the active search after a mutation that could change which
    /// plugins match; a no-op when no search is active.
    pub fn rerun_search(&mut self) {
        if self.search.needle.is_empty() {
            filters::clear_search(&mut self.game.plugins);
            self.search.results.clear();
            self.search.selected = 0;
            return;
        }
        let needle = self.search.needle.clone();
        self.begin_search(&needle);
    }

    pub fn end_search(&mut self) {
        filters::clear_search(&mut self.game.plugins);
        self.search = SearchState::default();
    }

    // ---- settings dialog ---------------------------------------------

    pub fn open_settings(&mut self) {
        if !self.command_enabled(AppCommand::OpenSettings) {
            return;
        }
        // The draft always starts from the stored settings, so a previous
        // cancelled edit leaves no residue.
        self.settings_draft = Some(SettingsDraft::new(self.settings.clone()));
    }

    /// Commit or discard the settings dialog. On confirmation the candidate
    /// is sent to the backend, which answers with the recomputed set of
    /// installed games; the stored settings are only overwritten once the
    /// round-trip has resolved, success or not.
    pub fn close_settings(&mut self, confirmed: bool) -> Result<()> {
        let Some(draft) = self.settings_draft.take() else {
            return Ok(());
        };
        if !confirmed {
            self.set_status("Settings unchanged".to_string());
            return Ok(());
        }
        let mut candidate = draft.into_candidate();
        candidate.last_game = self.settings.last_game.clone();
        candidate.filters = self.settings.filters.clone();

        let outcome = self
            .bridge
            .query(Request::CloseSettings {
                settings: candidate.clone(),
            })
            .map_err(anyhow::Error::from)
            .and_then(|payload| {
                parse_payload::<Vec<String>>("closeSettings", payload).map_err(Into::into)
            });
        match outcome {
            Ok(installed) => {
                self.installed_games = installed;
                self.settings = candidate;
                self.notify("Settings applied.");
            }
            Err(err) => {
                // Continuation semantics: the error is surfaced, but the
                // candidate still becomes the current settings afterwards.
                self.handle_failure("Apply settings", &err);
                self.settings = candidate;
            }
        }
        Ok(())
    }

    // ---- clipboard ---------------------------------------------------

    pub fn copy_load_order(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::CopyLoadOrder) {
            return Ok(());
        }
        let text = self.game.plugin_names().join("\n");
        let mut clipboard = Clipboard::new().context("open clipboard")?;
        clipboard.set_text(text).context("copy load order")?;
        self.notify("The load order has been copied to the clipboard.");
        Ok(())
    }

    pub fn copy_content(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::CopyContent) {
            return Ok(());
        }
        let messages: Vec<_> = self
            .game
            .global_messages
            .iter()
            .map(|message| {
                json!({
                    "type": message.kind.label(),
                    "content": message.text,
                })
            })
            .collect();
        let plugins: Vec<_> = self
            .game
            .plugins
            .iter()
            .map(|plugin| {
                json!({
                    "name": plugin.name,
                    "crc": plugin.crc,
                    "version": plugin.version,
                    "isActive": plugin.is_active,
                    "isEmpty": plugin.is_empty,
                    "loadsArchive": plugin.loads_archive,
                    "priority": plugin.priority,
                    "isPriorityGlobal": plugin.is_priority_global,
                    "messages": plugin.messages,
                    "tags": plugin.tags,
                    "isDirty": plugin.is_dirty,
                })
            })
            .collect();
        let report = serde_json::to_string_pretty(&json!({
            "messages": messages,
            "plugins": plugins,
        }))
        .context("serialize content report")?;
        let mut clipboard = Clipboard::new().context("open clipboard")?;
        clipboard.set_text(report).context("copy content")?;
        self.notify("The content has been copied to the clipboard.");
        Ok(())
    }

    pub fn copy_metadata(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::CopyMetadata) {
            return Ok(());
        }
        let Some(name) = self.selected_plugin_name() else {
            return Ok(());
        };
        let userlist = self
            .game
            .find_plugin(&name)
            .and_then(|plugin| plugin.userlist.clone())
            .unwrap_or_default();
        if userlist.is_empty() {
            self.notify(format!("\"{name}\" has no user-added metadata to copy."));
            return Ok(());
        }
        let text =
            serde_json::to_string_pretty(&userlist).context("serialize plugin metadata")?;
        let mut clipboard = Clipboard::new().context("open clipboard")?;
        clipboard.set_text(text).context("copy metadata")?;
        self.notify(format!(
            "The metadata for \"{name}\" has been copied to the clipboard."
        ));
        Ok(())
    }

    // ---- readme / logs -----------------------------------------------

    /// The backend knows where the documentation is installed; opening it
    /// is just another query.
    pub fn open_readme(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::OpenReadme) {
            return Ok(());
        }
        self.bridge.query(Request::OpenReadme)?;
        self.set_status("Opened the readme.");
        Ok(())
    }

    pub fn open_log_location(&mut self) -> Result<()> {
        if !self.command_enabled(AppCommand::OpenLogLocation) {
            return Ok(());
        }
        let dir = log_directory().context("no usable home directory for logs")?;
        std::process::Command::new("xdg-open")
            .arg(&dir)
            .spawn()
            .with_context(|| format!("open {}", dir.display()))?;
        self.set_status(format!("Opened {}", dir.display()));
        Ok(())
    }

    // ---- quit --------------------------------------------------------

    pub fn try_quit(&mut self) {
        // Snapshot presence, not the mode, is the source of truth for an
        // unapplied sort.
        let change = if matches!(self.mode, UiMode::Editor(_)) {
            "metadata edits"
        } else if self.game.has_unapplied_sort() {
            "sorted load order"
        } else {
            self.should_quit = true;
            return;
        };
        self.open_dialog(Dialog {
            title: "Quit?".to_string(),
            message: format!(
                "You have not yet applied or cancelled your {change}. Are you sure you want to \
                 quit?"
            ),
            yes_label: "Quit".to_string(),
            no_label: "Cancel".to_string(),
            choice: DialogChoice::No,
            kind: DialogKind::QuitWithUnapplied { change },
        });
    }

    fn perform_quit_discarding_changes(&mut self) -> Result<()> {
        self.bridge.query(Request::DiscardUnappliedChanges)?;
        self.should_quit = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeError;
    use crate::game::{MessageKind, Plugin, Tag};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct ScriptedReply {
        expect: &'static str,
        reply: Result<Option<String>, &'static str>,
    }

    struct ScriptedBridge {
        replies: VecDeque<ScriptedReply>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl QueryBridge for ScriptedBridge {
        fn query(&mut self, request: Request) -> Result<Option<String>, BridgeError> {
            self.calls.borrow_mut().push(request.name().to_string());
            let scripted = self
                .replies
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request: {}", request.name()));
            assert_eq!(request.name(), scripted.expect, "request order");
            scripted.reply.map_err(|message| BridgeError::Backend {
                command: scripted.expect,
                message: message.to_string(),
            })
        }
    }

    fn ok(expect: &'static str, payload: &str) -> ScriptedReply {
        ScriptedReply {
            expect,
            reply: Ok(Some(payload.to_string())),
        }
    }

    fn ack(expect: &'static str) -> ScriptedReply {
        ScriptedReply {
            expect,
            reply: Ok(None),
        }
    }

    fn fail(expect: &'static str, message: &'static str) -> ScriptedReply {
        ScriptedReply {
            expect,
            reply: Err(message),
        }
    }

    fn plugin(name: &str, crc: u32) -> Plugin {
        Plugin {
            crc,
            version: "1.0".to_string(),
            is_active: true,
            ..Plugin::new(name)
        }
    }

    fn app_with(replies: Vec<ScriptedReply>) -> (App, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let bridge = ScriptedBridge {
            replies: replies.into(),
            calls: Rc::clone(&calls),
        };
        let game = Game {
            folder: "skyrimse".to_string(),
            plugins: vec![plugin("A.esp", 1), plugin("B.esp", 2), plugin("C.esp", 3)],
            ..Game::default()
        };
        let settings = Settings {
            update_masterlist: false,
            ..Settings::default()
        };
        let app = App::new(Box::new(bridge), game, settings);
        (app, calls)
    }

    fn names(app: &App) -> Vec<String> {
        app.game.plugin_names()
    }

    #[test]
    fn sort_with_identical_order_never_enters_sorting() {
        let (mut app, calls) = app_with(vec![
            ok(
                "sortPlugins",
                r#"{"globalMessages": [],
                    "plugins": [
                        {"name": "A.esp", "crc": 11, "isEmpty": true},
                        {"name": "B.esp", "crc": 2, "isEmpty": false},
                        {"name": "C.esp", "crc": 3, "isEmpty": false}
                    ]}"#,
            ),
            ack("discardUnappliedChanges"),
        ]);
        app.sort_plugins().unwrap();

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(app.game.old_load_order, None);
        assert_eq!(app.game.load_order, None);
        assert_eq!(names(&app), vec!["A.esp", "B.esp", "C.esp"]);
        // Header fields are still absorbed from the response.
        assert_eq!(app.game.plugins[0].crc, 11);
        assert!(app.game.plugins[0].is_empty);
        assert_eq!(
            calls.borrow().as_slice(),
            ["sortPlugins", "discardUnappliedChanges"]
        );
        assert_eq!(app.status, "Sorting made no changes to the load order.");
    }

    #[test]
    fn sort_with_new_order_enters_sorting_and_swaps_toolbar() {
        let (mut app, calls) = app_with(vec![ok(
            "sortPlugins",
            r#"{"globalMessages": [],
                "plugins": [
                    {"name": "B.esp", "crc": 2, "isEmpty": false},
                    {"name": "A.esp", "crc": 1, "isEmpty": false},
                    {"name": "C.esp", "crc": 3, "isEmpty": false}
                ]}"#,
        )]);
        app.sort_plugins().unwrap();

        assert_eq!(app.mode, UiMode::Sorting);
        assert_eq!(names(&app), vec!["B.esp", "A.esp", "C.esp"]);
        assert_eq!(
            app.game
                .old_load_order
                .as_ref()
                .unwrap()
                .iter()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>(),
            vec!["A.esp", "B.esp", "C.esp"]
        );
        assert_eq!(
            app.game.load_order,
            Some(vec![
                "B.esp".to_string(),
                "A.esp".to_string(),
                "C.esp".to_string()
            ])
        );

        let toolbar = app.toolbar();
        assert!(toolbar.show_apply_sort);
        assert!(toolbar.show_cancel_sort);
        assert!(!toolbar.show_update_masterlist);
        assert!(!toolbar.show_sort);
        assert!(!toolbar.game_menu_enabled);

        // Sorting gates game switching and further sorts.
        assert!(!app.command_enabled(AppCommand::ChangeGame));
        assert!(!app.command_enabled(AppCommand::SortPlugins));
        assert_eq!(calls.borrow().as_slice(), ["sortPlugins"]);
    }

    #[test]
    fn sort_cycle_surfaces_exact_message_and_commits_nothing() {
        let cycle = "Cyclic interaction detected: A -> B -> A";
        let (mut app, _calls) = app_with(vec![ok(
            "sortPlugins",
            &format!(
                r#"{{"globalMessages": [{{"type": "error", "text": "{cycle}"}}], "plugins": null}}"#
            ),
        )]);
        let err = app.sort_plugins().unwrap_err();
        assert!(err.to_string().contains(cycle), "{err}");
        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(names(&app), vec!["A.esp", "B.esp", "C.esp"]);
        assert_eq!(app.game.old_load_order, None);
        assert_eq!(app.game.load_order, None);
    }

    #[test]
    fn sort_runs_masterlist_update_first_when_enabled() {
        let (mut app, calls) = app_with(vec![
            ScriptedReply {
                expect: "updateMasterlist",
                reply: Ok(None),
            },
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "A.esp"}, {"name": "B.esp"}, {"name": "C.esp"}
                ]}"#,
            ),
            ack("discardUnappliedChanges"),
        ]);
        app.settings.update_masterlist = true;
        app.sort_plugins().unwrap();
        assert_eq!(
            calls.borrow().as_slice(),
            ["updateMasterlist", "sortPlugins", "discardUnappliedChanges"]
        );
    }

    #[test]
    fn sort_continues_when_masterlist_update_fails() {
        let (mut app, calls) = app_with(vec![
            fail("updateMasterlist", "network unreachable"),
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "B.esp"}, {"name": "A.esp"}, {"name": "C.esp"}
                ]}"#,
            ),
        ]);
        app.settings.update_masterlist = true;
        app.sort_plugins().unwrap();

        // The stale masterlist is still sortable.
        assert_eq!(app.mode, UiMode::Sorting);
        assert_eq!(names(&app), vec!["B.esp", "A.esp", "C.esp"]);
        assert_eq!(
            calls.borrow().as_slice(),
            ["updateMasterlist", "sortPlugins"]
        );
        // The update failure was surfaced on the way through.
        assert!(app.log.iter().any(|entry| {
            entry.level == LogLevel::Error && entry.message.contains("network unreachable")
        }));
    }

    #[test]
    fn apply_sort_commits_order_and_clears_snapshots() {
        let (mut app, calls) = app_with(vec![
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "C.esp", "crc": 3}, {"name": "A.esp", "crc": 1}, {"name": "B.esp", "crc": 2}
                ]}"#,
            ),
            ack("applySort"),
        ]);
        app.sort_plugins().unwrap();
        app.apply_sort().unwrap();

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(names(&app), vec!["C.esp", "A.esp", "B.esp"]);
        assert_eq!(app.game.old_load_order, None);
        assert_eq!(app.game.load_order, None);
        assert!(app.toolbar().show_sort);
        assert!(app.toolbar().game_menu_enabled);
        assert_eq!(calls.borrow().as_slice(), ["sortPlugins", "applySort"]);
    }

    #[test]
    fn cancel_sort_restores_exact_presort_sequence() {
        let (mut app, _calls) = app_with(vec![
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "C.esp"}, {"name": "B.esp"}, {"name": "A.esp"}
                ]}"#,
            ),
            ok(
                "cancelSort",
                r#"[{"type": "info", "text": "pending changes discarded"}]"#,
            ),
        ]);
        app.sort_plugins().unwrap();
        app.cancel_sort().unwrap();

        assert_eq!(app.mode, UiMode::Normal);
        assert_eq!(names(&app), vec!["A.esp", "B.esp", "C.esp"]);
        assert_eq!(app.game.old_load_order, None);
        assert_eq!(app.game.load_order, None);
        assert_eq!(app.game.global_messages.len(), 1);
        assert_eq!(
            app.game.global_messages[0].text,
            "pending changes discarded"
        );
    }

    #[test]
    fn failed_apply_keeps_sorting_state() {
        let (mut app, _calls) = app_with(vec![
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "B.esp"}, {"name": "A.esp"}, {"name": "C.esp"}
                ]}"#,
            ),
            fail("applySort", "load order is locked"),
        ]);
        app.sort_plugins().unwrap();
        let result = app.apply_sort();
        app.finish("Apply sort", result);

        // State stays as of the last successful step.
        assert_eq!(app.mode, UiMode::Sorting);
        assert!(app.game.has_unapplied_sort());
        assert!(app.status.contains("load order is locked"));
        assert_eq!(app.log.last().unwrap().level, LogLevel::Error);
    }

    #[test]
    fn clear_plugin_metadata_merges_derived_fields_only() {
        let (mut app, _calls) = app_with(vec![ok(
            "clearPluginMetadata",
            r#"{"name": "B.esp", "priority": 4, "isPriorityGlobal": true,
                "messages": [{"type": "info", "text": "from masterlist"}],
                "tags": [{"name": "Delev"}], "isDirty": true}"#,
        )]);
        app.game.find_plugin_mut("B.esp").unwrap().userlist = Some(UserMetadata {
            priority: 99,
            ..UserMetadata::default()
        });

        app.perform_clear_plugin_metadata("B.esp").unwrap();
        let b = app.game.find_plugin("B.esp").unwrap();
        assert_eq!(b.userlist, None);
        assert_eq!(b.priority, 4);
        assert!(b.is_priority_global);
        assert!(b.is_dirty);
        // Identity fields are untouched.
        assert_eq!(b.name, "B.esp");
        assert_eq!(b.crc, 2);
        assert_eq!(b.version, "1.0");
    }

    #[test]
    fn clear_all_metadata_drops_every_userlist() {
        let (mut app, _calls) = app_with(vec![ok(
            "clearAllMetadata",
            r#"[{"name": "A.esp", "priority": 1}, {"name": "C.esp", "priority": 3}]"#,
        )]);
        for name in ["A.esp", "C.esp"] {
            app.game.find_plugin_mut(name).unwrap().userlist =
                Some(UserMetadata::default());
        }
        app.perform_clear_all_metadata().unwrap();
        assert!(app.game.plugins.iter().all(|p| p.userlist.is_none()));
        assert_eq!(app.game.find_plugin("C.esp").unwrap().priority, 3);
    }

    #[test]
    fn editor_apply_merges_derived_and_keeps_raw_userlist() {
        let (mut app, calls) = app_with(vec![
            ack("editorOpened"),
            ok(
                "editorClosed",
                r#"{"name": "A.esp", "priority": 6, "isDirty": true,
                    "messages": [{"type": "warning", "text": "needs cleaning"}]}"#,
            ),
        ]);
        app.search.needle = "needs cleaning".to_string();
        app.open_editor().unwrap();
        let UiMode::Editor(session) = &mut app.mode else {
            panic!("editor did not open");
        };
        session.draft.priority = 6;
        assert!(app.sidebar_draggable());
        assert!(!app.command_enabled(AppCommand::SortPlugins));
        assert!(!app.command_enabled(AppCommand::OpenSettings));

        app.close_editor(true).unwrap();
        assert_eq!(app.mode, UiMode::Normal);
        assert!(!app.sidebar_draggable());
        let a = app.game.find_plugin("A.esp").unwrap();
        assert_eq!(a.priority, 6);
        assert!(a.is_dirty);
        assert_eq!(a.userlist.as_ref().unwrap().priority, 6);
        // The active search was re-run against the new metadata.
        assert!(a.is_search_result);
        assert_eq!(app.search.results, vec![0]);
        assert_eq!(calls.borrow().as_slice(), ["editorOpened", "editorClosed"]);
    }

    #[test]
    fn editor_cancel_skips_the_merge() {
        let (mut app, _calls) = app_with(vec![ack("editorOpened"), ack("editorClosed")]);
        app.open_editor().unwrap();
        let UiMode::Editor(session) = &mut app.mode else {
            panic!("editor did not open");
        };
        session.draft.priority = 42;
        app.close_editor(false).unwrap();
        assert_eq!(app.mode, UiMode::Normal);
        let a = app.game.find_plugin("A.esp").unwrap();
        assert_eq!(a.priority, 0);
        assert_eq!(a.userlist, None);
    }

    #[test]
    fn editor_list_rows_are_display_only() {
        let (mut app, _calls) = app_with(vec![ack("editorOpened"), ack("editorClosed")]);
        app.game.find_plugin_mut("A.esp").unwrap().userlist = Some(UserMetadata {
            load_after: vec!["Skyrim.esm".to_string()],
            tags: vec![Tag {
                name: "Delev".to_string(),
                is_added: true,
                condition: String::new(),
            }],
            ..UserMetadata::default()
        });
        app.open_editor().unwrap();
        let UiMode::Editor(session) = &mut app.mode else {
            panic!("editor did not open");
        };
        assert_eq!(session.row_value(EditorRow::LoadAfter), "Skyrim.esm");
        assert_eq!(session.row_value(EditorRow::Tags), "1 entry");
        assert_eq!(session.row_value(EditorRow::Requirements), "none");
        assert_eq!(session.row_value(EditorRow::DirtyInfo), "none");

        // Adjusting a display-only row leaves the draft untouched.
        session.selected = EDITOR_ROWS
            .iter()
            .position(|row| *row == EditorRow::LoadAfter)
            .unwrap();
        let before = session.draft.clone();
        session.adjust_selected(1);
        assert_eq!(session.draft, before);
        app.close_editor(false).unwrap();
    }

    #[test]
    fn open_readme_is_a_backend_query_gated_by_mode() {
        let (mut app, calls) = app_with(vec![ack("openReadme")]);
        app.open_readme().unwrap();
        assert_eq!(calls.borrow().as_slice(), ["openReadme"]);
        assert_eq!(app.status, "Opened the readme.");

        // No readme while a sort is pending.
        app.mode = UiMode::Sorting;
        app.open_readme().unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn conflicts_filter_is_single_target() {
        let (mut app, _calls) = app_with(vec![
            ok(
                "getConflictingPlugins",
                r#"{"generalMessages": [], "plugins": [
                    {"metadata": {"name": "A.esp"}, "conflicts": false},
                    {"metadata": {"name": "C.esp"}, "conflicts": true}
                ]}"#,
            ),
            ok(
                "getConflictingPlugins",
                r#"{"generalMessages": [], "plugins": [
                    {"metadata": {"name": "A.esp"}, "conflicts": true}
                ]}"#,
            ),
        ]);

        // Activate on A.esp (selected by default).
        app.toggle_conflicts_filter().unwrap();
        assert_eq!(
            app.filters.conflict_target_plugin_name.as_deref(),
            Some("A.esp")
        );
        assert!(app.game.find_plugin("A.esp").unwrap().is_conflict_filter_target);
        assert!(app.game.find_plugin("C.esp").unwrap().conflicts_with_target);
        assert_eq!(app.visible, vec![0, 2]);

        // Activating on another plugin clears the previous target.
        app.selected = 1; // B.esp within the visible subset [A, C] -> C.esp
        app.toggle_conflicts_filter().unwrap();
        assert_eq!(
            app.filters.conflict_target_plugin_name.as_deref(),
            Some("C.esp")
        );
        assert!(!app.game.find_plugin("A.esp").unwrap().is_conflict_filter_target);
        assert!(app.game.find_plugin("C.esp").unwrap().is_conflict_filter_target);

        // Deactivating clears the target entirely.
        app.selected = app
            .visible
            .iter()
            .position(|&i| app.game.plugins[i].name == "C.esp")
            .unwrap();
        app.toggle_conflicts_filter().unwrap();
        assert_eq!(app.filters.conflict_target_plugin_name, None);
        assert!(app
            .game
            .plugins
            .iter()
            .all(|p| !p.is_conflict_filter_target && !p.conflicts_with_target));
        assert_eq!(app.visible, vec![0, 1, 2]);
    }

    #[test]
    fn sorting_undoes_the_conflicts_filter_first() {
        let (mut app, _calls) = app_with(vec![ok(
            "sortPlugins",
            r#"{"globalMessages": [], "plugins": [
                {"name": "B.esp"}, {"name": "A.esp"}, {"name": "C.esp"}
            ]}"#,
        )]);
        app.filters.conflict_target_plugin_name = Some("A.esp".to_string());
        app.game.find_plugin_mut("A.esp").unwrap().is_conflict_filter_target = true;
        app.sort_plugins().unwrap();
        assert_eq!(app.filters.conflict_target_plugin_name, None);
        assert!(app.game.plugins.iter().all(|p| !p.is_conflict_filter_target));
    }

    #[test]
    fn toggle_filter_saves_state_and_refilters() {
        let (mut app, calls) = app_with(vec![ack("saveFilterState")]);
        app.game.find_plugin_mut("B.esp").unwrap().is_active = false;
        app.toggle_filter("hideInactivePlugins").unwrap();
        assert!(app.filters.hide_inactive_plugins);
        assert!(app.settings.filters.hide_inactive_plugins);
        assert_eq!(app.visible, vec![0, 2]);
        assert_eq!(calls.borrow().as_slice(), ["saveFilterState"]);
    }

    #[test]
    fn change_game_replaces_the_game_wholesale() {
        let (mut app, _calls) = app_with(vec![ok(
            "changeGame",
            r#"{"folder": "fallout4",
                "masterlist": {"revision": "f4rev", "date": ""},
                "globalMessages": [],
                "plugins": [{"name": "Fallout4.esm", "isActive": true}]}"#,
        )]);
        app.filters.conflict_target_plugin_name = Some("A.esp".to_string());
        app.change_game("fallout4").unwrap();
        assert_eq!(app.game.folder, "fallout4");
        assert_eq!(names(&app), vec!["Fallout4.esm"]);
        assert_eq!(app.filters.conflict_target_plugin_name, None);
        assert_eq!(app.visible, vec![0]);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn change_game_to_same_folder_is_a_no_op() {
        let (mut app, calls) = app_with(Vec::new());
        app.change_game("skyrimse").unwrap();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn masterlist_update_reports_revision_or_no_change() {
        let (mut app, _calls) = app_with(vec![
            ok(
                "updateMasterlist",
                r#"{"masterlist": {"revision": "ab12cd3", "date": "2026-08-25"},
                    "globalMessages": [],
                    "plugins": [{"name": "A.esp", "priority": 2}]}"#,
            ),
            ScriptedReply {
                expect: "updateMasterlist",
                reply: Ok(None),
            },
        ]);
        app.update_masterlist().unwrap();
        assert_eq!(app.status, "Masterlist updated to revision ab12cd3.");
        assert_eq!(app.game.masterlist.revision, "ab12cd3");
        assert_eq!(app.game.find_plugin("A.esp").unwrap().priority, 2);

        app.update_masterlist().unwrap();
        assert_eq!(app.status, "No masterlist update was necessary.");
    }

    #[test]
    fn settings_commit_adopts_candidate_even_on_backend_error() {
        let (mut app, _calls) = app_with(vec![fail("closeSettings", "disk full")]);
        app.open_settings();
        app.settings_draft
            .as_mut()
            .unwrap()
            .candidate
            .enable_debug_logging = true;
        app.close_settings(true).unwrap();

        assert!(app.settings.enable_debug_logging);
        assert!(app.status.contains("disk full"));
    }

    #[test]
    fn settings_commit_updates_installed_games_on_success() {
        let (mut app, _calls) =
            app_with(vec![ok("closeSettings", r#"["skyrimse", "fallout4"]"#)]);
        app.open_settings();
        app.settings_draft.as_mut().unwrap().candidate.language = "de".to_string();
        app.close_settings(true).unwrap();
        assert_eq!(app.installed_games, vec!["skyrimse", "fallout4"]);
        assert_eq!(app.settings.language, "de");
    }

    #[test]
    fn settings_cancel_discards_the_draft() {
        let (mut app, calls) = app_with(Vec::new());
        app.open_settings();
        app.settings_draft
            .as_mut()
            .unwrap()
            .candidate
            .enable_debug_logging = true;
        app.close_settings(false).unwrap();
        assert!(!app.settings.enable_debug_logging);
        assert!(app.settings_draft.is_none());
        assert!(calls.borrow().is_empty());

        // Reopening starts from the stored settings again.
        app.open_settings();
        assert!(!app.settings_draft.as_ref().unwrap().candidate.enable_debug_logging);
    }

    #[test]
    fn quit_with_pending_sort_discards_after_confirmation() {
        let (mut app, calls) = app_with(vec![
            ok(
                "sortPlugins",
                r#"{"globalMessages": [], "plugins": [
                    {"name": "B.esp"}, {"name": "A.esp"}, {"name": "C.esp"}
                ]}"#,
            ),
            ack("discardUnappliedChanges"),
        ]);
        app.sort_plugins().unwrap();
        app.try_quit();
        assert!(!app.should_quit);
        let dialog = app.dialog.clone().unwrap();
        assert!(dialog.message.contains("sorted load order"));

        app.dialog_toggle_choice();
        app.dialog_confirm();
        assert!(app.should_quit);
        assert_eq!(
            calls.borrow().as_slice(),
            ["sortPlugins", "discardUnappliedChanges"]
        );
    }

    #[test]
    fn quit_in_normal_mode_needs_no_confirmation() {
        let (mut app, calls) = app_with(Vec::new());
        app.try_quit();
        assert!(app.should_quit);
        assert!(app.dialog.is_none());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn declined_dialog_runs_nothing() {
        let (mut app, calls) = app_with(Vec::new());
        app.prompt_redate_plugins();
        assert!(app.dialog.is_some());
        // Default choice is No.
        app.dialog_confirm();
        assert!(calls.borrow().is_empty());
        assert!(app.dialog.is_none());
    }

    #[test]
    fn backend_failure_is_funnelled_into_status_log_and_toast() {
        let (mut app, _calls) = app_with(vec![fail("redatePlugins", "access denied")]);
        let result = app.perform_redate_plugins();
        app.finish("Redate plugins", result);
        assert_eq!(
            app.status,
            "Redate plugins failed: backend rejected redatePlugins: access denied"
        );
        assert_eq!(app.log.last().unwrap().level, LogLevel::Error);
        assert_eq!(app.toast.as_ref().unwrap().level, ToastLevel::Error);
    }

    #[test]
    fn global_message_kinds_drive_labels() {
        assert_eq!(MessageKind::Info.label(), "Note");
        assert_eq!(MessageKind::Error.label(), "Error");
    }
}
