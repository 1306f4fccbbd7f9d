use log::debug;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::plugin::PluginEntry;
use crate::records::{LinkCache, Npc, RecordError};
use crate::tokenizer::tokenize;

pub const VOICE_MATCH_WEIGHT: u32 = 10;
pub const NAME_MATCH_WEIGHT: u32 = 1;

/// Per-plugin weights, keyed by the plugin's index in the candidate list.
///
/// Zero weights are never stored, and iteration follows plugin order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Weights(BTreeMap<usize, u32>);

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, plugin: usize, amount: u32) {
        if amount > 0 {
            *self.0.entry(plugin).or_insert(0) += amount;
        }
    }

    pub fn merge(&mut self, other: &Weights) {
        for (&plugin, &amount) in &other.0 {
            self.add(plugin, amount);
        }
    }

    pub fn get(&self, plugin: usize) -> u32 {
        self.0.get(&plugin).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0.iter().map(|(&plugin, &amount)| (plugin, amount))
    }

    /// Candidates by descending weight; equal weights keep plugin order.
    pub fn ranked(&self) -> Vec<(usize, u32)> {
        let mut ranked: Vec<(usize, u32)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn best(&self) -> Option<usize> {
        self.ranked().first().map(|&(plugin, _)| plugin)
    }

    pub fn pretty(&self, plugins: &[PluginEntry]) -> String {
        let mut out = String::from("{");
        for (i, (plugin, amount)) in self.ranked().into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let name = plugins.get(plugin).map_or("?", |p| p.name.as_str());
            let _ = write!(out, "{}: {}", name, amount);
        }
        out.push('}');
        out
    }
}

/// Scores one NPC against every plugin.
///
/// Plugins must already have their name tokens cached. The NPC's race, if it
/// has one, has to resolve; its death item is only used when it does.
pub fn score_npc<C>(
    npc: &Npc,
    plugins: &[PluginEntry],
    cache: &C,
    debug: bool,
) -> Result<Weights, RecordError>
where
    C: LinkCache + ?Sized,
{
    let mut weights = Weights::new();

    if let Some(voice) = &npc.voice {
        for (i, plugin) in plugins.iter().enumerate() {
            if plugin.voice.as_ref() == Some(voice) {
                weights.add(i, VOICE_MATCH_WEIGHT);
            }
        }
    }

    let race = match &npc.race {
        Some(race) => Some(cache.resolve_race(race)?),
        None => None,
    };
    let death_item = npc
        .death_item
        .as_ref()
        .and_then(|death_item| cache.try_resolve_leveled_item(death_item));

    let race_editor_id = race.and_then(|race| race.editor_id.as_deref());
    let race_name = race.and_then(|race| race.name.as_deref());

    // An empty plugin name is contained in every target.
    let targets: Vec<String> = [
        npc.editor_id.as_deref(),
        npc.name.as_deref(),
        race_editor_id,
        race_name,
    ]
    .into_iter()
    .flatten()
    .map(str::to_lowercase)
    .collect();
    for (i, plugin) in plugins.iter().enumerate() {
        let needle = plugin.name.to_lowercase();
        for target in &targets {
            if target.contains(needle.as_str()) {
                weights.add(i, NAME_MATCH_WEIGHT);
            }
        }
    }

    let npc_tokens = tokenize([
        npc.name.as_deref(),
        npc.editor_id.as_deref(),
        race_name,
        race_editor_id,
        death_item.and_then(|item| item.editor_id.as_deref()),
    ]);
    if debug {
        debug!(
            "    Tokens for {} ({}): {:?}",
            npc.label(),
            npc.editor_id.as_deref().unwrap_or("-"),
            npc_tokens
        );
    }

    for (i, plugin) in plugins.iter().enumerate() {
        let overlap = plugin.tokens.intersection(&npc_tokens).count();
        weights.add(i, overlap as u32);
    }

    if debug {
        debug!("    Candidates for {}: {}", npc.label(), weights.pretty(plugins));
    }

    Ok(weights)
}
