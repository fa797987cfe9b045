use crate::game::{Message, MessageKind, Plugin};
use serde::{Deserialize, Serialize};

pub const FILTER_IDS: &[&str] = &[
    "hideVersionNumbers",
    "hideCRCs",
    "hideBashTags",
    "hideNotes",
    "hideDoNotCleanMessages",
    "hideAllPluginMessages",
    "hideInactivePlugins",
    "hideMessagelessPlugins",
];

/// Active filter set. The toggles round-trip through settings under their
/// wire ids; the content search string and the conflict target are session
/// state only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    #[serde(rename = "hideVersionNumbers")]
    pub hide_version_numbers: bool,
    #[serde(rename = "hideCRCs")]
    pub hide_crcs: bool,
    #[serde(rename = "hideBashTags")]
    pub hide_bash_tags: bool,
    #[serde(rename = "hideNotes")]
    pub hide_notes: bool,
    #[serde(rename = "hideDoNotCleanMessages")]
    pub hide_do_not_clean_messages: bool,
    #[serde(rename = "hideAllPluginMessages")]
    pub hide_all_plugin_messages: bool,
    #[serde(rename = "hideInactivePlugins")]
    pub hide_inactive_plugins: bool,
    #[serde(rename = "hideMessagelessPlugins")]
    pub hide_messageless_plugins: bool,
    #[serde(skip)]
    pub content_search_string: String,
    #[serde(skip)]
    pub conflict_target_plugin_name: Option<String>,
}

impl Filters {
    pub fn get(&self, id: &str) -> Option<bool> {
        match id {
            "hideVersionNumbers" => Some(self.hide_version_numbers),
            "hideCRCs" => Some(self.hide_crcs),
            "hideBashTags" => Some(self.hide_bash_tags),
            "hideNotes" => Some(self.hide_notes),
            "hideDoNotCleanMessages" => Some(self.hide_do_not_clean_messages),
            "hideAllPluginMessages" => Some(self.hide_all_plugin_messages),
            "hideInactivePlugins" => Some(self.hide_inactive_plugins),
            "hideMessagelessPlugins" => Some(self.hide_messageless_plugins),
            _ => None,
        }
    }

    pub fn set(&mut self, id: &str, enabled: bool) -> bool {
        match id {
            "hideVersionNumbers" => self.hide_version_numbers = enabled,
            "hideCRCs" => self.hide_crcs = enabled,
            "hideBashTags" => self.hide_bash_tags = enabled,
            "hideNotes" => self.hide_notes = enabled,
            "hideDoNotCleanMessages" => self.hide_do_not_clean_messages = enabled,
            "hideAllPluginMessages" => self.hide_all_plugin_messages = enabled,
            "hideInactivePlugins" => self.hide_inactive_plugins = enabled,
            "hideMessagelessPlugins" => self.hide_messageless_plugins = enabled,
            _ => return false,
        }
        true
    }

    pub fn label(id: &str) -> &'static str {
        match id {
            "hideVersionNumbers" => "Hide version numbers",
            "hideCRCs" => "Hide CRCs",
            "hideBashTags" => "Hide Bash Tag suggestions",
            "hideNotes" => "Hide notes",
            "hideDoNotCleanMessages" => "Hide 'Do not clean' messages",
            "hideAllPluginMessages" => "Hide all plugin messages",
            "hideInactivePlugins" => "Hide inactive plugins",
            "hideMessagelessPlugins" => "Hide messageless plugins",
            _ => "Unknown filter",
        }
    }
}

/// The messages a plugin card actually shows under the active filter set.
pub fn visible_messages<'a>(messages: &'a [Message], filters: &Filters) -> Vec<&'a Message> {
    if filters.hide_all_plugin_messages {
        return Vec::new();
    }
    messages
        .iter()
        .filter(|message| {
            if filters.hide_notes && message.kind == MessageKind::Info {
                return false;
            }
            if filters.hide_do_not_clean_messages && message.text.contains("Do not clean") {
                return false;
            }
            true
        })
        .collect()
}

/// Everything on a plugin's card that content search and the content filter
/// can match against.
pub fn card_content(plugin: &Plugin, filters: &Filters) -> String {
    let mut content = plugin.name.clone();
    if !filters.hide_version_numbers && !plugin.version.is_empty() {
        content.push('\n');
        content.push_str(&plugin.version);
    }
    if !filters.hide_crcs && plugin.crc != 0 {
        content.push('\n');
        content.push_str(&plugin.crc_label());
    }
    if !filters.hide_bash_tags {
        for tag in &plugin.tags {
            content.push('\n');
            content.push_str(&tag.name);
        }
    }
    for message in visible_messages(&plugin.messages, filters) {
        content.push('\n');
        content.push_str(&message.text);
    }
    content
}

/// Pure mapping from the plugin sequence and the active filter set to the
/// indices of the plugins to display. Source ordering is preserved and all
/// predicates apply simultaneously.
pub fn visible_plugins(plugins: &[Plugin], filters: &Filters) -> Vec<usize> {
    let needle = filters.content_search_string.to_lowercase();
    plugins
        .iter()
        .enumerate()
        .filter(|(_, plugin)| {
            if filters.hide_inactive_plugins && !plugin.is_active {
                return false;
            }
            if filters.hide_messageless_plugins
                && visible_messages(&plugin.messages, filters).is_empty()
            {
                return false;
            }
            if let Some(target) = &filters.conflict_target_plugin_name {
                if plugin.name != *target && !plugin.conflicts_with_target {
                    return false;
                }
            }
            if !needle.is_empty() && !card_content(plugin, filters).to_lowercase().contains(&needle)
            {
                return false;
            }
            true
        })
        .map(|(index, _)| index)
        .collect()
}

/// Mark search matches on the plugins and return the matching indices.
/// Clears all previous match flags first; an empty needle just clears.
pub fn run_search(plugins: &mut [Plugin], filters: &Filters, needle: &str) -> Vec<usize> {
    for plugin in plugins.iter_mut() {
        plugin.is_search_result = false;
    }
    if needle.is_empty() {
        return Vec::new();
    }
    let needle = needle.to_lowercase();
    let mut results = Vec::new();
    for (index, plugin) in plugins.iter_mut().enumerate() {
        if card_content(plugin, filters).to_lowercase().contains(&needle) {
            plugin.is_search_result = true;
            results.push(index);
        }
    }
    results
}

pub fn clear_search(plugins: &mut [Plugin]) {
    for plugin in plugins.iter_mut() {
        plugin.is_search_result = false;
    }
}
