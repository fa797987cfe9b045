use crate::game::{Message, Plugin, Tag};
use serde::{Deserialize, Serialize};

/// Locally authored metadata overrides for a plugin (the userlist entry).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMetadata {
    pub enabled: bool,
    pub priority: i32,
    pub is_priority_global: bool,
    pub load_after: Vec<String>,
    pub requirements: Vec<String>,
    pub incompatibilities: Vec<String>,
    pub messages: Vec<Message>,
    pub tags: Vec<Tag>,
    pub dirty_info: Vec<DirtyInfo>,
}

impl UserMetadata {
    pub fn is_empty(&self) -> bool {
        *self == UserMetadata::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirtyInfo {
    pub crc: u32,
    pub itm: u32,
    pub udr: u32,
    pub nav: u32,
    pub cleaning_utility: String,
}

/// Candidate metadata sent to the backend when the editor is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginEdits {
    pub name: String,
    pub userlist: UserMetadata,
}

/// The backend's recomputed plugin fields, returned after a metadata edit
/// or clear. Merging one into a plugin only ever touches the derived
/// fields; name, crc and version are left alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedMetadata {
    pub name: String,
    pub priority: i32,
    pub is_priority_global: bool,
    pub messages: Vec<Message>,
    pub tags: Vec<Tag>,
    pub is_dirty: bool,
}

impl DerivedMetadata {
    pub fn merge_into(&self, plugin: &mut Plugin) {
        plugin.priority = self.priority;
        plugin.is_priority_global = self.is_priority_global;
        plugin.messages = self.messages.clone();
        plugin.tags = self.tags.clone();
        plugin.is_dirty = self.is_dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MessageKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_never_touches_identity_fields() {
        let mut plugin = Plugin::new("A.esp");
        plugin.crc = 0xBEEF;
        plugin.version = "2.3".to_string();
        plugin.userlist = Some(UserMetadata {
            priority: 7,
            ..UserMetadata::default()
        });

        let derived = DerivedMetadata {
            name: "A.esp".to_string(),
            priority: 12,
            is_priority_global: true,
            messages: vec![Message::new(MessageKind::Warning, "recheck")],
            tags: vec![Tag {
                name: "Relev".to_string(),
                is_added: true,
                condition: String::new(),
            }],
            is_dirty: true,
        };
        derived.merge_into(&mut plugin);

        assert_eq!(plugin.name, "A.esp");
        assert_eq!(plugin.crc, 0xBEEF);
        assert_eq!(plugin.version, "2.3");
        assert_eq!(plugin.priority, 12);
        assert!(plugin.is_priority_global);
        assert_eq!(plugin.messages.len(), 1);
        assert_eq!(plugin.tags[0].name, "Relev");
        assert!(plugin.is_dirty);
        // Merging derived fields does not drop the userlist; command
        // handlers decide that separately.
        assert!(plugin.userlist.is_some());
    }

    #[test]
    fn plugin_edits_round_trip_as_camel_case() {
        let edits = PluginEdits {
            name: "B.esp".to_string(),
            userlist: UserMetadata {
                enabled: true,
                priority: -10,
                load_after: vec!["A.esp".to_string()],
                dirty_info: vec![DirtyInfo {
                    crc: 1,
                    itm: 2,
                    udr: 3,
                    nav: 0,
                    cleaning_utility: "xEdit".to_string(),
                }],
                ..UserMetadata::default()
            },
        };
        let raw = serde_json::to_string(&edits).unwrap();
        assert!(raw.contains("\"loadAfter\""));
        assert!(raw.contains("\"cleaningUtility\""));
        let back: PluginEdits = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, edits);
    }
}
