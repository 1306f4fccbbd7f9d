use log::info;
use std::collections::HashMap;

use crate::plugin::{DeathItemSelection, PluginEntry, Selection};
use crate::records::{FormKey, LeveledItem, Npc, RecordError};
use crate::scoring::Weights;

/// How many assigned creatures are named per death item in narration and reports.
pub(crate) const ARCHETYPES_SHOWN: usize = 6;

/// Saved choices keyed by death item. A saved entry with no choice means skip.
pub fn saved_selection_index(
    previous: &[DeathItemSelection],
) -> Result<HashMap<&FormKey, Selection>, RecordError> {
    let mut saved = HashMap::with_capacity(previous.len());
    for selection in previous {
        let choice = selection.selection.clone().unwrap_or(Selection::Skip);
        if saved.insert(&selection.death_item, choice).is_some() {
            return Err(RecordError::Malformed(format!(
                "more than one saved selection for death item {}",
                selection.death_item
            )));
        }
    }
    Ok(saved)
}

/// Groups creatures by death item and sums their plugin weights.
#[derive(Debug, Default)]
pub struct SelectionAggregator {
    selections: Vec<DeathItemSelection>,
    weights: Vec<Weights>,
    index: HashMap<FormKey, usize>,
}

impl SelectionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Assigns `npc` to the selection for `death_item`, creating it on first sight.
    pub fn add(&mut self, npc: &Npc, death_item: &LeveledItem, npc_weights: &Weights) {
        let slot = match self.index.get(&death_item.form_key) {
            Some(&slot) => slot,
            None => {
                let slot = self.selections.len();
                self.selections.push(DeathItemSelection::new(
                    death_item.form_key.clone(),
                    death_item.label(),
                ));
                self.weights.push(Weights::new());
                self.index.insert(death_item.form_key.clone(), slot);
                slot
            }
        };

        self.selections[slot].assigned_npcs.push(npc.clone());
        self.weights[slot].merge(npc_weights);
    }

    #[cfg(test)]
    fn weights_for(&self, death_item: &FormKey) -> Option<&Weights> {
        self.index.get(death_item).map(|&slot| &self.weights[slot])
    }

    /// Picks a plugin for every death item, in the order they were first seen.
    ///
    /// A saved choice always wins. Otherwise the heaviest plugin is chosen, the
    /// earlier plugin on a tie, and a death item with no candidates stays unset.
    pub fn finish(
        self,
        plugins: &[PluginEntry],
        saved: &HashMap<&FormKey, Selection>,
        debug: bool,
    ) -> Vec<DeathItemSelection> {
        let mut selections = self.selections;

        for (selection, weights) in selections.iter_mut().zip(self.weights.iter()) {
            if let Some(choice) = saved.get(&selection.death_item) {
                selection.selection = Some(choice.clone());
                if debug {
                    info!(
                        "      {}: previously selected {}.",
                        selection.creature_entry_name,
                        choice.display_name()
                    );
                }
                continue;
            }

            let plugin = match weights.best().and_then(|best| plugins.get(best)) {
                Some(plugin) => plugin,
                None => continue,
            };
            selection.selection = Some(Selection::Plugin(plugin.clone()));

            if debug {
                info!(
                    "    {}: heuristic selected {}.",
                    selection.creature_entry_name, plugin.sort_name
                );
                info!("      From: {}", weights.pretty(plugins));
                let archetypes: Vec<String> = selection
                    .assigned_npcs
                    .iter()
                    .take(ARCHETYPES_SHOWN)
                    .map(Npc::label)
                    .collect();
                info!("      Archetypes: [{}]", archetypes.join(", "));
            }
        }

        selections
    }
}
