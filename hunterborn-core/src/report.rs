use crate::plugin::DeathItemSelection;
use crate::selection::ARCHETYPES_SHOWN;

/// Plain-text summary of a heuristics run, one block per death item.
pub fn selection_report(selections: &[DeathItemSelection]) -> String {
    let chosen = selections
        .iter()
        .filter(|s| s.selected_plugin().is_some())
        .count();
    let skipped = selections
        .iter()
        .filter(|s| s.selection.as_ref().map_or(false, |c| c.is_skip()))
        .count();
    let unset = selections.len() - chosen - skipped;

    let mut log = format!("Death items: {}\n", selections.len());
    log.push_str(&format!(
        "chosen: {}, skipped: {}, unmatched: {}\n",
        chosen, skipped, unset
    ));

    for selection in selections {
        let choice = selection
            .selection
            .as_ref()
            .map_or("(no match)", |c| c.display_name());
        log.push_str(&format!(
            "{} [{}] -> {}\n",
            selection.creature_entry_name, selection.death_item, choice
        ));

        if !selection.assigned_npcs.is_empty() {
            let names: Vec<String> = selection
                .assigned_npcs
                .iter()
                .take(ARCHETYPES_SHOWN)
                .map(|npc| npc.label())
                .collect();
            log.push_str(&format!(
                "  npcs: {} ({})\n",
                selection.assigned_npcs.len(),
                names.join(", ")
            ));
        }
    }

    log
}
