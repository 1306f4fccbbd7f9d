use log::info;
use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod eligibility;
pub mod load;
pub mod plugin;
pub mod records;
pub mod report;
pub mod scoring;
pub mod selection;
pub mod tokenizer;

pub use config::ExclusionLists;
pub use eligibility::{creature_exclusion, is_creature, Exclusion};
pub use plugin::{DeathItemSelection, EntryType, PluginEntry, PluginKind, Selection};
pub use records::{FormKey, LeveledItem, LinkCache, Npc, Race, RecordCache, RecordError};
pub use scoring::{score_npc, Weights};
pub use selection::SelectionAggregator;
pub use tokenizer::{tokenize, TokenSet};

/// The heuristics pass failed as a whole; `source` holds the first fault.
#[derive(Debug, Error)]
pub enum HeuristicsError {
    #[error("heuristic selection failed: {source}")]
    Classification {
        #[source]
        source: RecordError,
    },
}

#[derive(Debug, Error)]
pub enum ExtenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Records(#[from] RecordError),
    #[error(transparent)]
    Heuristics(#[from] HeuristicsError),
}

pub type Result<T> = std::result::Result<T, ExtenderError>;

/// Assigns a plugin to the death item of every creature in `npcs`.
///
/// Plugin voices are added to a copy of `lists` before any NPC is looked at,
/// and plugin name tokens are cached on `plugins`. Saved choices in `previous`
/// override the heuristic for their death item. Any fault aborts the whole
/// pass; there is no partial result.
pub fn make_heuristic_selections<'a, I, C>(
    npcs: I,
    plugins: &mut [PluginEntry],
    previous: &[DeathItemSelection],
    lists: &ExclusionLists,
    cache: &C,
    debug: bool,
) -> std::result::Result<Vec<DeathItemSelection>, HeuristicsError>
where
    I: IntoIterator<Item = &'a Npc>,
    C: LinkCache + ?Sized,
{
    select(npcs, plugins, previous, lists, cache, debug)
        .map_err(|source| HeuristicsError::Classification { source })
}

fn select<'a, I, C>(
    npcs: I,
    plugins: &mut [PluginEntry],
    previous: &[DeathItemSelection],
    lists: &ExclusionLists,
    cache: &C,
    debug: bool,
) -> std::result::Result<Vec<DeathItemSelection>, RecordError>
where
    I: IntoIterator<Item = &'a Npc>,
    C: LinkCache + ?Sized,
{
    let lists = lists.with_plugin_voices(plugins);
    let saved = selection::saved_selection_index(previous)?;

    for plugin in plugins.iter_mut() {
        plugin.tokenize_names();
    }
    let plugins: &[PluginEntry] = plugins;

    if debug {
        info!("Tokenizing plugin names.");
        for plugin in plugins {
            info!("    Plugin: {} -> {:?}", plugin.name, plugin.tokens);
        }
        info!("Analyzing NPCs.");
    }

    let mut aggregator = SelectionAggregator::new();
    for npc in npcs {
        if !is_creature(npc, &lists, debug) {
            continue;
        }
        let death_item = match &npc.death_item {
            Some(death_item) => cache.resolve_leveled_item(death_item)?,
            None => continue,
        };

        let weights = score_npc(npc, plugins, cache, debug)?;
        aggregator.add(npc, death_item, &weights);
    }

    if debug {
        info!("Selecting plugins for {} death items.", aggregator.len());
    }

    Ok(aggregator.finish(plugins, &saved, debug))
}
