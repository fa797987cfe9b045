use crate::metadata::{DerivedMetadata, UserMetadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Info,
    Warning,
    Error,
}

impl MessageKind {
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Info => "Note",
            MessageKind::Warning => "Warning",
            MessageKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub name: String,
    pub is_added: bool,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plugin {
    pub name: String,
    pub crc: u32,
    pub version: String,
    pub is_active: bool,
    pub is_empty: bool,
    pub loads_archive: bool,
    pub priority: i32,
    pub is_priority_global: bool,
    pub messages: Vec<Message>,
    pub tags: Vec<Tag>,
    pub is_dirty: bool,
    pub userlist: Option<UserMetadata>,
    #[serde(skip)]
    pub is_search_result: bool,
    #[serde(skip)]
    pub is_conflict_filter_target: bool,
    #[serde(skip)]
    pub conflicts_with_target: bool,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn crc_label(&self) -> String {
        format!("{:08X}", self.crc)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterlistInfo {
    pub revision: String,
    pub date: String,
}

/// Wholesale game payload, returned by `getGameData` and `changeGame`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameData {
    pub folder: String,
    pub masterlist: MasterlistInfo,
    pub global_messages: Vec<Message>,
    pub plugins: Vec<Plugin>,
}

/// `updateMasterlist` payload. `null` on the wire means no update was needed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterlistUpdate {
    pub masterlist: MasterlistInfo,
    pub global_messages: Vec<Message>,
    pub plugins: Vec<DerivedMetadata>,
}

/// `sortPlugins` payload. `plugins` is absent when sorting failed, e.g. on a
/// cyclic interaction, in which case the cycle is named in a global message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortResult {
    pub global_messages: Vec<Message>,
    pub plugins: Option<Vec<SortedPlugin>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortedPlugin {
    pub name: String,
    pub crc: u32,
    pub is_empty: bool,
}

/// `getConflictingPlugins` payload: one entry per loaded plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConflictReport {
    pub general_messages: Vec<Message>,
    pub plugins: Vec<ConflictEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConflictEntry {
    pub metadata: DerivedMetadata,
    pub conflicts: bool,
}

/// In-memory mirror of the backend's committed state for one game.
///
/// Replaced wholesale on game switch or content refresh; plugins within it
/// are reconciled field-by-field against backend responses so UI-only
/// transient flags survive. `old_load_order` and `load_order` are both
/// `Some` only between "sort computed" and "sort applied/cancelled"; their
/// absence means no unapplied sort exists.
#[derive(Debug, Clone, Default)]
pub struct Game {
    pub folder: String,
    pub masterlist: MasterlistInfo,
    pub global_messages: Vec<Message>,
    pub plugins: Vec<Plugin>,
    pub old_load_order: Option<Vec<Plugin>>,
    pub load_order: Option<Vec<String>>,
}

impl Game {
    pub fn from_data(data: GameData) -> Self {
        Self {
            folder: data.folder,
            masterlist: data.masterlist,
            global_messages: data.global_messages,
            plugins: data.plugins,
            old_load_order: None,
            load_order: None,
        }
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name.clone()).collect()
    }

    pub fn find_plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn find_plugin_mut(&mut self, name: &str) -> Option<&mut Plugin> {
        self.plugins.iter_mut().find(|p| p.name == name)
    }

    pub fn has_unapplied_sort(&self) -> bool {
        self.old_load_order.is_some() || self.load_order.is_some()
    }

    pub fn order_matches(&self, sorted: &[SortedPlugin]) -> bool {
        sorted.len() == self.plugins.len()
            && sorted
                .iter()
                .zip(&self.plugins)
                .all(|(sorted, current)| sorted.name == current.name)
    }

    /// Update the sort-derived header fields of existing plugins in place,
    /// without reordering anything.
    pub fn absorb_sorted_fields(&mut self, sorted: &[SortedPlugin]) {
        for entry in sorted {
            if let Some(plugin) = self.find_plugin_mut(&entry.name) {
                plugin.crc = entry.crc;
                plugin.is_empty = entry.is_empty;
            }
        }
    }

    /// Build the proposed plugin sequence from a sort response, carrying over
    /// every known plugin (with refreshed crc/is_empty) and creating entries
    /// for plugins the backend saw but the mirror did not.
    pub fn reconcile_sorted(&self, sorted: &[SortedPlugin]) -> Vec<Plugin> {
        sorted
            .iter()
            .map(|entry| {
                let mut plugin = self
                    .find_plugin(&entry.name)
                    .cloned()
                    .unwrap_or_else(|| Plugin::new(entry.name.clone()));
                plugin.crc = entry.crc;
                plugin.is_empty = entry.is_empty;
                plugin
            })
            .collect()
    }

    /// Merge a masterlist update: the masterlist header and global messages
    /// are replaced, and per-plugin derived fields are reconciled into any
    /// plugin the mirror already knows.
    pub fn apply_masterlist_update(&mut self, update: MasterlistUpdate) {
        self.masterlist = update.masterlist;
        self.global_messages = update.global_messages;
        for derived in &update.plugins {
            if let Some(plugin) = self.find_plugin_mut(&derived.name) {
                derived.merge_into(plugin);
            }
        }
    }

    pub fn clear_conflict_flags(&mut self) {
        for plugin in &mut self.plugins {
            plugin.is_conflict_filter_target = false;
            plugin.conflicts_with_target = false;
        }
    }
}
