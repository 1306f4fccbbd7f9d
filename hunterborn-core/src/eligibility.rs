use log::info;
use std::fmt;

use crate::config::ExclusionLists;
use crate::records::{FormKey, Npc};

/// The first rule that kept an NPC from being treated as a creature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exclusion {
    ForbiddenEditorId(String),
    NoDeathItem,
    ForbiddenDeathItem(FormKey),
    ForbiddenKeyword(FormKey),
    ForbiddenFaction(FormKey),
    VoiceNotAllowed(Option<FormKey>),
    ForbiddenFlags(u32),
    Ghost,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::ForbiddenEditorId(edid) => write!(f, "forbidden editorId {}", edid),
            Exclusion::NoDeathItem => write!(f, "no DeathItem"),
            Exclusion::ForbiddenDeathItem(key) => write!(f, "forbidden DeathItem {}", key),
            Exclusion::ForbiddenKeyword(key) => write!(f, "forbidden keyword {}", key),
            Exclusion::ForbiddenFaction(key) => write!(f, "forbidden faction {}", key),
            Exclusion::VoiceNotAllowed(Some(key)) => write!(f, "voice not allowed ({})", key),
            Exclusion::VoiceNotAllowed(None) => write!(f, "no voice"),
            Exclusion::ForbiddenFlags(flags) => write!(f, "forbidden flag 0x{:08X}", flags),
            Exclusion::Ghost => write!(f, "forbidden NO GHOSTS"),
        }
    }
}

/// Checks the exclusion rules in order and returns the first one that applies.
pub fn creature_exclusion(npc: &Npc, lists: &ExclusionLists) -> Option<Exclusion> {
    if let Some(edid) = npc
        .editor_id
        .as_deref()
        .and_then(|edid| lists.is_forbidden_editor_id(edid))
    {
        return Some(Exclusion::ForbiddenEditorId(edid.to_string()));
    }

    let death_item = match &npc.death_item {
        Some(death_item) => death_item,
        None => return Some(Exclusion::NoDeathItem),
    };

    if lists.forbidden_death_items.contains(death_item) {
        return Some(Exclusion::ForbiddenDeathItem(death_item.clone()));
    }

    if let Some(keyword) = npc
        .keywords
        .iter()
        .find(|keyword| lists.forbidden_keywords.contains(*keyword))
    {
        return Some(Exclusion::ForbiddenKeyword(keyword.clone()));
    }

    if let Some(placement) = npc
        .factions
        .iter()
        .find(|placement| lists.forbidden_factions.contains(&placement.faction))
    {
        return Some(Exclusion::ForbiddenFaction(placement.faction.clone()));
    }

    let voice_allowed = npc
        .voice
        .as_ref()
        .map_or(false, |voice| lists.allowed_voices.contains(voice));
    if !voice_allowed {
        return Some(Exclusion::VoiceNotAllowed(npc.voice.clone()));
    }

    let forbidden_flags = npc.flags & lists.forbidden_flags;
    if forbidden_flags != 0 {
        return Some(Exclusion::ForbiddenFlags(forbidden_flags));
    }

    if let Some(ghost) = &lists.ghost_ability {
        if npc.actor_effects.contains(ghost) {
            return Some(Exclusion::Ghost);
        }
    }

    None
}

pub fn is_creature(npc: &Npc, lists: &ExclusionLists, debug: bool) -> bool {
    match creature_exclusion(npc, lists) {
        Some(exclusion) => {
            if debug {
                info!("      Skipping {} -- {}", npc.label(), exclusion);
            }
            false
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{npc_flags, RankPlacement};

    fn key(id: u32) -> FormKey {
        FormKey::new(id, "Skyrim.esm")
    }

    fn lists() -> ExclusionLists {
        ExclusionLists {
            forbidden_npc_editor_ids: vec!["MQ101Alduin".to_string()],
            forbidden_death_items: [key(0x100)].into_iter().collect(),
            forbidden_keywords: [key(0x200)].into_iter().collect(),
            forbidden_factions: [key(0x300)].into_iter().collect(),
            allowed_voices: [key(0x400)].into_iter().collect(),
            forbidden_flags: npc_flags::IS_GHOST | npc_flags::UNIQUE,
            ghost_ability: Some(key(0x500)),
        }
    }

    fn wolf() -> Npc {
        Npc {
            form_key: Some(key(0x1)),
            editor_id: Some("EncWolf".to_string()),
            name: Some("Wolf".to_string()),
            death_item: Some(key(0x101)),
            voice: Some(key(0x400)),
            ..Default::default()
        }
    }

    #[test]
    fn plain_creature_is_included() {
        assert_eq!(creature_exclusion(&wolf(), &lists()), None);
        assert!(is_creature(&wolf(), &lists(), false));
    }

    #[test]
    fn missing_death_item_is_excluded() {
        let npc = Npc {
            death_item: None,
            ..wolf()
        };
        assert_eq!(creature_exclusion(&npc, &lists()), Some(Exclusion::NoDeathItem));
        assert!(!is_creature(&npc, &lists(), true));
    }

    #[test]
    fn forbidden_editor_id_wins_over_everything() {
        // Also lacks a death item and a voice, but the editor id check comes first.
        let npc = Npc {
            editor_id: Some("mq101ALDUIN".to_string()),
            death_item: None,
            voice: None,
            ..Default::default()
        };
        assert_eq!(
            creature_exclusion(&npc, &lists()),
            Some(Exclusion::ForbiddenEditorId("MQ101Alduin".to_string()))
        );
    }

    #[test]
    fn reports_rules_in_order() {
        let mut npc = wolf();
        npc.death_item = Some(key(0x100));
        npc.keywords = vec![key(0x200)];
        npc.factions = vec![RankPlacement {
            faction: key(0x300),
            rank: 0,
        }];
        npc.voice = Some(key(0x401));
        npc.flags = npc_flags::UNIQUE | npc_flags::FEMALE;
        npc.actor_effects = vec![key(0x500)];

        let lists = lists();
        assert_eq!(
            creature_exclusion(&npc, &lists),
            Some(Exclusion::ForbiddenDeathItem(key(0x100)))
        );
        npc.death_item = Some(key(0x101));
        assert_eq!(
            creature_exclusion(&npc, &lists),
            Some(Exclusion::ForbiddenKeyword(key(0x200)))
        );
        npc.keywords.clear();
        assert_eq!(
            creature_exclusion(&npc, &lists),
            Some(Exclusion::ForbiddenFaction(key(0x300)))
        );
        npc.factions.clear();
        assert_eq!(
            creature_exclusion(&npc, &lists),
            Some(Exclusion::VoiceNotAllowed(Some(key(0x401))))
        );
        npc.voice = Some(key(0x400));
        assert_eq!(
            creature_exclusion(&npc, &lists),
            Some(Exclusion::ForbiddenFlags(npc_flags::UNIQUE))
        );
        npc.flags = npc_flags::FEMALE;
        assert_eq!(creature_exclusion(&npc, &lists), Some(Exclusion::Ghost));
        npc.actor_effects.clear();
        assert_eq!(creature_exclusion(&npc, &lists), None);
    }

    #[test]
    fn absent_voice_is_never_allowed() {
        let npc = Npc {
            voice: None,
            ..wolf()
        };
        assert_eq!(
            creature_exclusion(&npc, &lists()),
            Some(Exclusion::VoiceNotAllowed(None))
        );
    }
}
