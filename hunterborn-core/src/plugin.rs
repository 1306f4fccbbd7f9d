use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::records::{FormKey, Npc};
use crate::tokenizer::{tokenize, TokenSet};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    #[default]
    Animal,
    Monster,
}

/// Where a plugin entry came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginKind {
    /// Loaded from an addon definition file.
    #[default]
    Addon,
    /// Hard-coded entry whose drop behaviour is modelled on a known death item.
    Internal { known_death_item: FormKey },
}

/// A candidate catalog entry describing carcass and material yields.
///
/// Only `name`, `proper_name`, `sort_name`, `voice` and `tokens` take part in
/// the heuristics; the rest is carried for the patcher that consumes the
/// selections.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginEntry {
    pub kind: PluginKind,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    pub proper_name: String,
    pub sort_name: String,
    pub toggle: Option<FormKey>,
    pub carcass_message_box: Option<FormKey>,
    pub meat: Option<FormKey>,
    pub carcass_size: u32,
    pub carcass_weight: u32,
    pub carcass_value: u32,
    pub pelt_count: [u32; 4],
    pub fur_plate_count: [u32; 4],
    pub materials: Vec<BTreeMap<FormKey, u32>>,
    pub discard: Vec<FormKey>,
    pub shared_death_items: Option<FormKey>,
    pub blood_type: Option<FormKey>,
    pub venom: Option<FormKey>,
    pub voice: Option<FormKey>,
    #[serde(skip)]
    pub tokens: TokenSet,
}

impl Default for PluginEntry {
    fn default() -> Self {
        Self {
            kind: PluginKind::Addon,
            entry_type: EntryType::Animal,
            name: "Critter".to_string(),
            proper_name: "Critter".to_string(),
            sort_name: "Critter".to_string(),
            toggle: None,
            carcass_message_box: None,
            meat: None,
            carcass_size: 1,
            carcass_weight: 10,
            carcass_value: 10,
            pelt_count: [1; 4],
            fur_plate_count: [1; 4],
            materials: Vec::new(),
            discard: Vec::new(),
            shared_death_items: None,
            blood_type: None,
            venom: None,
            voice: None,
            tokens: TokenSet::new(),
        }
    }
}

impl PluginEntry {
    pub fn new(entry_type: EntryType, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entry_type,
            proper_name: name.clone(),
            sort_name: name.clone(),
            name,
            ..Default::default()
        }
    }

    pub fn internal(entry_type: EntryType, name: impl Into<String>, known_death_item: FormKey) -> Self {
        Self {
            kind: PluginKind::Internal { known_death_item },
            ..Self::new(entry_type, name)
        }
    }

    pub fn with_voice(mut self, voice: FormKey) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn known_death_item(&self) -> Option<&FormKey> {
        match &self.kind {
            PluginKind::Internal { known_death_item } => Some(known_death_item),
            PluginKind::Addon => None,
        }
    }

    /// Recomputes the cached name tokens.
    pub fn tokenize_names(&mut self) {
        self.tokens = tokenize([
            Some(self.name.as_str()),
            Some(self.sort_name.as_str()),
            Some(self.proper_name.as_str()),
        ]);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Selection {
    /// The user chose to leave this death item alone.
    Skip,
    Plugin(PluginEntry),
}

impl Selection {
    pub fn is_skip(&self) -> bool {
        matches!(self, Selection::Skip)
    }

    pub fn plugin(&self) -> Option<&PluginEntry> {
        match self {
            Selection::Plugin(plugin) => Some(plugin),
            Selection::Skip => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Selection::Plugin(plugin) => &plugin.proper_name,
            Selection::Skip => "skip",
        }
    }
}

/// The decision for one death item, shared by every creature that drops it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeathItemSelection {
    pub death_item: FormKey,
    pub creature_entry_name: String,
    #[serde(skip)]
    pub assigned_npcs: Vec<Npc>,
    #[serde(default)]
    pub selection: Option<Selection>,
}

impl DeathItemSelection {
    pub fn new(death_item: FormKey, creature_entry_name: impl Into<String>) -> Self {
        Self {
            death_item,
            creature_entry_name: creature_entry_name.into(),
            assigned_npcs: Vec::new(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn selected_plugin(&self) -> Option<&PluginEntry> {
        self.selection.as_ref().and_then(Selection::plugin)
    }
}
