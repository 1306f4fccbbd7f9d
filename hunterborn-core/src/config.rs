use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::plugin::PluginEntry;
use crate::records::FormKey;

/// Static lookup tables deciding which NPCs count as creatures.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionLists {
    /// Compared case-insensitively.
    pub forbidden_npc_editor_ids: Vec<String>,
    pub forbidden_death_items: HashSet<FormKey>,
    pub forbidden_keywords: HashSet<FormKey>,
    pub forbidden_factions: HashSet<FormKey>,
    pub allowed_voices: HashSet<FormKey>,
    /// Mask over the NPC configuration flags.
    pub forbidden_flags: u32,
    pub ghost_ability: Option<FormKey>,
}

impl ExclusionLists {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Adds every plugin voice to the allowed voices. Never removes one.
    pub fn allow_plugin_voices(&mut self, plugins: &[PluginEntry]) {
        self.allowed_voices
            .extend(plugins.iter().filter_map(|plugin| plugin.voice.clone()));
    }

    /// A copy of these lists with every plugin voice allowed.
    pub fn with_plugin_voices(&self, plugins: &[PluginEntry]) -> Self {
        let mut lists = self.clone();
        lists.allow_plugin_voices(plugins);
        lists
    }

    /// Case folding is the same full Unicode lower-casing the scorer uses.
    pub fn is_forbidden_editor_id(&self, editor_id: &str) -> Option<&str> {
        let editor_id = editor_id.to_lowercase();
        self.forbidden_npc_editor_ids
            .iter()
            .find(|forbidden| forbidden.to_lowercase() == editor_id)
            .map(String::as_str)
    }
}
