use crate::filters::Filters;
use serde::{Deserialize, Serialize};

/// Front-end mirror of the backend-persisted settings. The on-disk form is
/// owned by the backend; this struct only ever round-trips through the
/// bridge, and in memory it always equals the last value the backend
/// acknowledged (except inside an open settings dialog draft).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub game: String,
    pub last_game: String,
    pub language: String,
    pub enable_debug_logging: bool,
    pub update_masterlist: bool,
    pub games: Vec<GameSettings>,
    pub filters: Filters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: "auto".to_string(),
            last_game: String::new(),
            language: "en".to_string(),
            enable_debug_logging: false,
            update_masterlist: true,
            games: Vec::new(),
            filters: Filters::default(),
        }
    }
}

impl Settings {
    pub fn game_name(&self, folder: &str) -> String {
        self.games
            .iter()
            .find(|game| game.folder == folder)
            .map(|game| game.name.clone())
            .unwrap_or_else(|| folder.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    pub name: String,
    pub folder: String,
    #[serde(rename = "type")]
    pub game_type: String,
    pub master: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub registry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    DefaultGame,
    Language,
    EnableDebugLogging,
    UpdateMasterlist,
}

pub const SETTINGS_ROWS: &[SettingsRow] = &[
    SettingsRow::DefaultGame,
    SettingsRow::Language,
    SettingsRow::EnableDebugLogging,
    SettingsRow::UpdateMasterlist,
];

const LANGUAGES: &[&str] = &["en", "de", "es", "fr", "fi", "pl", "pt_BR", "ru", "zh_CN"];

/// Editable copy of the settings shown in the settings dialog. The stored
/// settings stay untouched until the draft is committed through the
/// backend; cancelling the dialog just drops the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    pub candidate: Settings,
    pub selected: usize,
}

impl SettingsDraft {
    pub fn new(stored: Settings) -> Self {
        Self {
            candidate: stored,
            selected: 0,
        }
    }

    pub fn into_candidate(self) -> Settings {
        self.candidate
    }

    pub fn selected_row(&self) -> SettingsRow {
        SETTINGS_ROWS[self.selected.min(SETTINGS_ROWS.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % SETTINGS_ROWS.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(SETTINGS_ROWS.len() - 1);
    }

    /// Cycle or toggle the value of the selected row.
    pub fn cycle_selected(&mut self) {
        match self.selected_row() {
            SettingsRow::DefaultGame => {
                let mut folders: Vec<String> = vec!["auto".to_string()];
                folders.extend(self.candidate.games.iter().map(|g| g.folder.clone()));
                let current = folders
                    .iter()
                    .position(|folder| *folder == self.candidate.game)
                    .unwrap_or(0);
                self.candidate.game = folders[(current + 1) % folders.len()].clone();
            }
            SettingsRow::Language => {
                let current = LANGUAGES
                    .iter()
                    .position(|language| *language == self.candidate.language)
                    .unwrap_or(0);
                self.candidate.language = LANGUAGES[(current + 1) % LANGUAGES.len()].to_string();
            }
            SettingsRow::EnableDebugLogging => {
                self.candidate.enable_debug_logging = !self.candidate.enable_debug_logging;
            }
            SettingsRow::UpdateMasterlist => {
                self.candidate.update_masterlist = !self.candidate.update_masterlist;
            }
        }
    }

    pub fn row_label(row: SettingsRow) -> &'static str {
        match row {
            SettingsRow::DefaultGame => "Default game",
            SettingsRow::Language => "Language",
            SettingsRow::EnableDebugLogging => "Enable debug logging",
            SettingsRow::UpdateMasterlist => "Update masterlist before sorting",
        }
    }

    pub fn row_value(&self, row: SettingsRow) -> String {
        match row {
            SettingsRow::DefaultGame => self.candidate.game.clone(),
            SettingsRow::Language => self.candidate.language.clone(),
            SettingsRow::EnableDebugLogging => on_off(self.candidate.enable_debug_logging),
            SettingsRow::UpdateMasterlist => on_off(self.candidate.update_masterlist),
        }
    }
}

fn on_off(value: bool) -> String {
    let label = if value { "on" } else { "off" };
    label.to_string()
}
