use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable record identifier: a 24-bit local id plus the module that owns it.
///
/// The textual form is `"0A1B2C:Skyrim.esm"`, which is also how it is
/// serialized.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    id: u32,
    module: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormKeyParseError {
    #[error("form key '{0}' is missing the ':' module separator")]
    MissingSeparator(String),

    #[error("form key '{0}' has an invalid record id")]
    InvalidId(String),

    #[error("form key '{0}' has an empty module name")]
    EmptyModule(String),
}

impl FormKey {
    pub const MAX_ID: u32 = 0x00FF_FFFF;

    pub fn new(id: u32, module: impl Into<String>) -> Self {
        Self {
            id: id & Self::MAX_ID,
            module: module.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.id, self.module)
    }
}

impl FromStr for FormKey {
    type Err = FormKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, module) = s
            .split_once(':')
            .ok_or_else(|| FormKeyParseError::MissingSeparator(s.to_string()))?;

        let id = id.trim();
        let id = id
            .strip_prefix("0x")
            .or_else(|| id.strip_prefix("0X"))
            .unwrap_or(id);
        let id = u32::from_str_radix(id, 16)
            .ok()
            .filter(|&id| id <= Self::MAX_ID)
            .ok_or_else(|| FormKeyParseError::InvalidId(s.to_string()))?;

        let module = module.trim();
        if module.is_empty() {
            return Err(FormKeyParseError::EmptyModule(s.to_string()));
        }

        Ok(Self::new(id, module))
    }
}

impl TryFrom<String> for FormKey {
    type Error = FormKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(value: FormKey) -> Self {
        value.to_string()
    }
}

/// NPC configuration flags, as stored in the actor base data.
pub mod npc_flags {
    pub const FEMALE: u32 = 0x0000_0001;
    pub const ESSENTIAL: u32 = 0x0000_0002;
    pub const IS_CHARGEN_FACE_PRESET: u32 = 0x0000_0004;
    pub const RESPAWN: u32 = 0x0000_0008;
    pub const AUTO_CALC_STATS: u32 = 0x0000_0010;
    pub const UNIQUE: u32 = 0x0000_0020;
    pub const DOESNT_AFFECT_STEALTH_METER: u32 = 0x0000_0040;
    pub const PC_LEVEL_MULT: u32 = 0x0000_0080;
    pub const PROTECTED: u32 = 0x0000_0800;
    pub const SUMMONABLE: u32 = 0x0000_4000;
    pub const DOESNT_BLEED: u32 = 0x0001_0000;
    pub const BLEEDOUT_OVERRIDE: u32 = 0x0004_0000;
    pub const OPPOSITE_GENDER_ANIMS: u32 = 0x0008_0000;
    pub const SIMPLE_ACTOR: u32 = 0x0010_0000;
    pub const IS_GHOST: u32 = 0x2000_0000;
    pub const INVULNERABLE: u32 = 0x8000_0000;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPlacement {
    pub faction: FormKey,
    #[serde(default)]
    pub rank: i8,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Npc {
    pub form_key: Option<FormKey>,
    pub editor_id: Option<String>,
    pub name: Option<String>,
    pub race: Option<FormKey>,
    pub death_item: Option<FormKey>,
    pub keywords: Vec<FormKey>,
    pub factions: Vec<RankPlacement>,
    pub flags: u32,
    pub voice: Option<FormKey>,
    pub actor_effects: Vec<FormKey>,
}

impl Npc {
    /// Best human-readable name: display name, then editor id, then form key.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Some(editor_id) = &self.editor_id {
            return editor_id.clone();
        }
        match &self.form_key {
            Some(form_key) => form_key.to_string(),
            None => "unknown npc".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Race {
    pub form_key: FormKey,
    #[serde(default)]
    pub editor_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A leveled item list used as an NPC's death item (its drop table).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeveledItem {
    pub form_key: FormKey,
    #[serde(default)]
    pub editor_id: Option<String>,
}

impl LeveledItem {
    pub fn label(&self) -> String {
        self.editor_id
            .clone()
            .unwrap_or_else(|| self.form_key.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("could not resolve {kind} record {form_key}")]
    Unresolved {
        kind: &'static str,
        form_key: FormKey,
    },

    #[error("malformed record data: {0}")]
    Malformed(String),
}

/// Resolves record links found on NPCs into the records they point at.
///
/// `resolve_*` treat a missing target as an error, `try_resolve_*` do not.
pub trait LinkCache {
    fn try_resolve_race(&self, form_key: &FormKey) -> Option<&Race>;

    fn try_resolve_leveled_item(&self, form_key: &FormKey) -> Option<&LeveledItem>;

    fn resolve_race(&self, form_key: &FormKey) -> Result<&Race, RecordError> {
        self.try_resolve_race(form_key)
            .ok_or_else(|| RecordError::Unresolved {
                kind: "race",
                form_key: form_key.clone(),
            })
    }

    fn resolve_leveled_item(&self, form_key: &FormKey) -> Result<&LeveledItem, RecordError> {
        self.try_resolve_leveled_item(form_key)
            .ok_or_else(|| RecordError::Unresolved {
                kind: "leveled item",
                form_key: form_key.clone(),
            })
    }
}

/// Pre-parsed record dump, as handed over by the record-store exporter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDump {
    pub npcs: Vec<Npc>,
    pub races: Vec<Race>,
    pub leveled_items: Vec<LeveledItem>,
}

/// In-memory link cache over a [`RecordDump`].
#[derive(Clone, Debug, Default)]
pub struct RecordCache {
    npcs: Vec<Npc>,
    races: HashMap<FormKey, Race>,
    leveled_items: HashMap<FormKey, LeveledItem>,
}

impl RecordCache {
    pub fn from_dump(dump: RecordDump) -> Result<Self, RecordError> {
        let mut races = HashMap::with_capacity(dump.races.len());
        for race in dump.races {
            let form_key = race.form_key.clone();
            if races.insert(form_key.clone(), race).is_some() {
                return Err(RecordError::Malformed(format!(
                    "duplicate race record {}",
                    form_key
                )));
            }
        }

        let mut leveled_items = HashMap::with_capacity(dump.leveled_items.len());
        for item in dump.leveled_items {
            let form_key = item.form_key.clone();
            if leveled_items.insert(form_key.clone(), item).is_some() {
                return Err(RecordError::Malformed(format!(
                    "duplicate leveled item record {}",
                    form_key
                )));
            }
        }

        Ok(Self {
            npcs: dump.npcs,
            races,
            leveled_items,
        })
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn insert_race(&mut self, race: Race) {
        self.races.insert(race.form_key.clone(), race);
    }

    pub fn insert_leveled_item(&mut self, item: LeveledItem) {
        self.leveled_items.insert(item.form_key.clone(), item);
    }
}

impl LinkCache for RecordCache {
    fn try_resolve_race(&self, form_key: &FormKey) -> Option<&Race> {
        self.races.get(form_key)
    }

    fn try_resolve_leveled_item(&self, form_key: &FormKey) -> Option<&LeveledItem> {
        self.leveled_items.get(form_key)
    }
}
