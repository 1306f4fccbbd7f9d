use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::ExclusionLists;
use crate::plugin::{DeathItemSelection, PluginEntry};
use crate::records::{FormKey, RecordCache, RecordDump};
use crate::{ExtenderError, Result};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|source| ExtenderError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_records(path: &Path) -> Result<RecordCache> {
    let dump: RecordDump = read_json(path)?;
    Ok(RecordCache::from_dump(dump)?)
}

pub fn load_exclusion_lists(path: &Path) -> Result<ExclusionLists> {
    read_json(path)
}

/// A definition file holds either one plugin entry or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum PluginFile {
    Many(Vec<PluginEntry>),
    One(Box<PluginEntry>),
}

/// Loads every `*.json` plugin definition under `dir`, in path order.
pub fn load_plugin_dir(dir: &Path) -> Result<Vec<PluginEntry>> {
    if !dir.is_dir() {
        return Err(ExtenderError::Config(format!(
            "Plugin directory does not exist: {}",
            dir.display()
        )));
    }

    let mut plugins = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ExtenderError::Config(format!("walking {}: {}", dir.display(), e)))?;
        let path = entry.path();
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if !entry.file_type().is_file() || !is_json {
            continue;
        }

        match read_json::<PluginFile>(path)? {
            PluginFile::Many(many) => plugins.extend(many),
            PluginFile::One(one) => plugins.push(*one),
        }
    }

    if plugins.is_empty() {
        warn!("No plugin definitions found under {}", dir.display());
    } else {
        info!("Loaded {} plugin definitions from {}", plugins.len(), dir.display());
    }

    Ok(plugins)
}

/// Loads saved selections. A missing file means there are none yet.
pub fn load_selections(path: &Path) -> Result<Vec<DeathItemSelection>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_json(path)
}

/// Keeps saved choices for death items this run did not see.
///
/// `selections` come first, in their own order, followed by every `previous`
/// entry whose death item none of them covers.
pub fn merge_selections(
    mut selections: Vec<DeathItemSelection>,
    previous: &[DeathItemSelection],
) -> Vec<DeathItemSelection> {
    let seen: HashSet<FormKey> = selections.iter().map(|s| s.death_item.clone()).collect();
    selections.extend(
        previous
            .iter()
            .filter(|saved| !seen.contains(&saved.death_item))
            .cloned(),
    );
    selections
}

pub fn save_selections(path: &Path, selections: &[DeathItemSelection]) -> Result<()> {
    write_json(path, selections)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(value).map_err(|source| ExtenderError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{EntryType, Selection};
    use crate::records::LinkCache;

    #[test]
    fn loads_plugins_from_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_wolf.json"),
            r#"{ "name": "Wolf", "proper_name": "Wolf", "sort_name": "Wolf" }"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("more")).unwrap();
        fs::write(
            dir.path().join("more").join("b_trolls.json"),
            r#"[{ "name": "Troll", "type": "Monster" }, { "name": "FrostTroll", "type": "Monster" }]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a plugin").unwrap();

        let plugins = load_plugin_dir(dir.path()).unwrap();
        let names: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Wolf", "Troll", "FrostTroll"]);
        assert_eq!(plugins[1].entry_type, EntryType::Monster);
    }

    #[test]
    fn missing_plugin_dir_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plugin_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ExtenderError::Config(_)));
    }

    #[test]
    fn bad_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();
        match load_exclusion_lists(&path) {
            Err(ExtenderError::Json { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn selections_survive_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("selections.json");
        assert!(load_selections(&path).unwrap().is_empty());

        let selections = vec![
            DeathItemSelection::new(FormKey::new(0x42, "Skyrim.esm"), "BearDeathItem")
                .with_selection(Selection::Plugin(PluginEntry::new(EntryType::Animal, "Bear"))),
            DeathItemSelection::new(FormKey::new(0x43, "Skyrim.esm"), "WolfDeathItem")
                .with_selection(Selection::Skip),
        ];
        save_selections(&path, &selections).unwrap();

        let loaded = load_selections(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].selected_plugin().unwrap().name, "Bear");
        assert!(loaded[1].selection.as_ref().unwrap().is_skip());
    }

    #[test]
    fn merge_keeps_unseen_saved_choices() {
        let wolf = FormKey::new(0x30, "Skyrim.esm");
        let troll = FormKey::new(0x44, "Skyrim.esm");
        let previous = vec![
            DeathItemSelection::new(troll.clone(), "TrollDeathItem").with_selection(Selection::Skip),
            DeathItemSelection::new(wolf.clone(), "WolfDeathItem").with_selection(Selection::Skip),
        ];
        let fresh = vec![DeathItemSelection::new(wolf.clone(), "WolfDeathItem")
            .with_selection(Selection::Plugin(PluginEntry::new(EntryType::Animal, "Wolf")))];

        let merged = merge_selections(fresh, &previous);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].death_item, wolf);
        assert_eq!(merged[0].selected_plugin().unwrap().name, "Wolf");
        assert_eq!(merged[1].death_item, troll);
        assert!(merged[1].selection.as_ref().unwrap().is_skip());
    }

    #[test]
    fn loads_record_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(
            &path,
            r#"{
                "npcs": [{ "editor_id": "EncWolf", "death_item": "000030:Skyrim.esm", "flags": 32 }],
                "races": [{ "form_key": "000020:Skyrim.esm", "editor_id": "WolfRace" }],
                "leveled_items": [{ "form_key": "000030:Skyrim.esm", "editor_id": "WolfDeathItem" }]
            }"#,
        )
        .unwrap();

        let cache = load_records(&path).unwrap();
        assert_eq!(cache.npcs().len(), 1);
        assert_eq!(cache.npcs()[0].flags, 32);
        assert!(cache
            .try_resolve_race(&FormKey::new(0x20, "Skyrim.esm"))
            .is_some());
    }
}
