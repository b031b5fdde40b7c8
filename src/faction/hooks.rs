//! Крючки приключений: слух, правда за ним и участники

use super::{Faction, Hook, HookKind, HookStatus};
use crate::dungeon::SpatialDungeon;
use crate::error::Result;
use crate::npc::Npc;
use crate::random::{SeededRandom, derive_seed};
use crate::settlement::SpatialSettlement;

struct HookTemplate {
    kind: HookKind,
    rumor: &'static str,
    truth: &'static str,
    reward: &'static str,
    danger: &'static str,
}

const SETTLEMENT_HOOKS: &[HookTemplate] = &[
    HookTemplate {
        kind: HookKind::Rescue,
        rumor: "People have been disappearing from {place} at night",
        truth: "A group of slavers is kidnapping villagers",
        reward: "Gold and the villagers' gratitude",
        danger: "The slavers are well-armed and ruthless",
    },
    HookTemplate {
        kind: HookKind::Mystery,
        rumor: "Strange lights have been seen in the old mill near {place}",
        truth: "A cult is performing rituals there",
        reward: "Whatever treasure the cult has gathered",
        danger: "The cult may have summoned something",
    },
    HookTemplate {
        kind: HookKind::Intrigue,
        rumor: "The leader of {place} has been acting strangely",
        truth: "The leader has been replaced by a doppelganger",
        reward: "The grateful leader's favor and gold",
        danger: "The doppelganger has allies in the court",
    },
    HookTemplate {
        kind: HookKind::Threat,
        rumor: "Livestock around {place} have been found dead with strange marks",
        truth: "A vampire lurks in the nearby woods",
        reward: "Bounty from the village council",
        danger: "The vampire is ancient and powerful",
    },
];

const DUNGEON_HOOKS: &[HookTemplate] = &[
    HookTemplate {
        kind: HookKind::Threat,
        rumor: "An ancient evil stirs in the depths of {place}",
        truth: "A powerful demon is awakening",
        reward: "Legendary treasure and fame",
        danger: "The demon's minions guard the way",
    },
    HookTemplate {
        kind: HookKind::Rescue,
        rumor: "A noble's heir was kidnapped and taken into {place}",
        truth: "Cultists plan to sacrifice the heir at the next full moon",
        reward: "Noble's eternal gratitude and gold",
        danger: "The cultists are fanatical",
    },
    HookTemplate {
        kind: HookKind::Mystery,
        rumor: "A famous adventurer never returned from {place}",
        truth: "They found something terrible and were transformed",
        reward: "Their legendary equipment",
        danger: "They are now a powerful undead",
    },
    HookTemplate {
        kind: HookKind::Treasure,
        rumor: "{place} holds the key to curing a plague",
        truth: "An ancient artifact within can cure any disease",
        reward: "The artifact and eternal gratitude",
        danger: "The artifact is guarded by deadly traps",
    },
];

const FACTION_HOOKS: &[HookTemplate] = &[
    HookTemplate {
        kind: HookKind::Intrigue,
        rumor: "{place} is planning something big",
        truth: "{place} is preparing to {goal}",
        reward: "Depending on which side you choose",
        danger: "{place} has many enemies",
    },
    HookTemplate {
        kind: HookKind::Intrigue,
        rumor: "{place} needs capable individuals for a special job",
        truth: "They want someone expendable for a dangerous mission",
        reward: "Good pay and faction standing",
        danger: "The mission is a suicide run",
    },
    HookTemplate {
        kind: HookKind::Treasure,
        rumor: "Someone stole something important from {place}",
        truth: "A rival has taken a powerful artifact",
        reward: "Faction favor and a share of the recovery",
        danger: "Both sides will come looking",
    },
];

const WILDERNESS_HOOKS: &[HookTemplate] = &[
    HookTemplate {
        kind: HookKind::Threat,
        rumor: "A dragon has been spotted in the mountains",
        truth: "A young dragon has claimed territory",
        reward: "Dragon's hoard",
        danger: "It's still a dragon",
    },
    HookTemplate {
        kind: HookKind::Threat,
        rumor: "Travelers on the road have been attacked by something huge",
        truth: "A troll has taken up residence under a bridge",
        reward: "Bounty and recovered goods",
        danger: "Trolls regenerate",
    },
    HookTemplate {
        kind: HookKind::Mystery,
        rumor: "Fey creatures have been spotted near the old woods",
        truth: "A portal to the fey realm has opened",
        reward: "Fey treasures and favors",
        danger: "Time passes differently there",
    },
];

/// К чему привязан крючок
#[derive(Debug, Clone, Copy)]
pub enum HookSubject<'a> {
    Settlement(&'a SpatialSettlement),
    Dungeon(&'a SpatialDungeon),
    Faction(&'a Faction),
    Wilderness,
}

impl HookSubject<'_> {
    fn discriminator(&self) -> &str {
        match self {
            HookSubject::Settlement(s) => &s.id,
            HookSubject::Dungeon(d) => &d.id,
            HookSubject::Faction(f) => &f.id,
            HookSubject::Wilderness => "wilderness",
        }
    }
}

/// Генерирует крючок для субъекта
///
/// `index` различает несколько крючков одного субъекта. Из `npcs` берутся
/// один-два причастных персонажа; первый становится источником.
pub fn generate_hook(
    seed: &str,
    subject: HookSubject<'_>,
    index: usize,
    npcs: &[&Npc],
) -> Result<Hook> {
    let mut rng = SeededRandom::new(derive_seed(
        seed,
        "hook",
        format!("{}:{index}", subject.discriminator()),
    ));

    let pool = match subject {
        HookSubject::Settlement(_) => SETTLEMENT_HOOKS,
        HookSubject::Dungeon(_) => DUNGEON_HOOKS,
        HookSubject::Faction(_) => FACTION_HOOKS,
        HookSubject::Wilderness => WILDERNESS_HOOKS,
    };
    let template = rng.pick(pool)?;
    let (place, goal) = match subject {
        HookSubject::Settlement(s) => (s.name.as_str(), ""),
        HookSubject::Dungeon(d) => (d.name.as_str(), ""),
        HookSubject::Faction(f) => (
            f.name.as_str(),
            f.next_goal()
                .map_or("expand their influence", |g| g.description.as_str()),
        ),
        HookSubject::Wilderness => ("", ""),
    };
    let fill = |text: &str| {
        text.replace("{place}", place)
            .replace("{goal}", &goal.to_lowercase())
    };

    let involved: Vec<&Npc> = if npcs.is_empty() {
        Vec::new()
    } else {
        let n = rng.between(1, 2) as usize;
        rng.sample(npcs, n)
    };

    let mut hook = Hook {
        id: rng.id("hook"),
        kind: template.kind,
        rumor: fill(template.rumor),
        truth: fill(template.truth),
        reward: Some(template.reward.to_string()),
        danger: Some(fill(template.danger)),
        source_settlement_id: None,
        source_npc_id: involved.first().map(|n| n.id.clone()),
        target_location_id: None,
        target_faction_id: None,
        involved_npc_ids: involved.iter().map(|n| n.id.clone()).collect(),
        involved_location_ids: Vec::new(),
        involved_faction_ids: Vec::new(),
        status: HookStatus::Available,
    };
    match subject {
        HookSubject::Settlement(s) => {
            hook.source_settlement_id = Some(s.id.clone());
            hook.involved_location_ids.push(s.id.clone());
        }
        HookSubject::Dungeon(d) => {
            hook.target_location_id = Some(d.id.clone());
            hook.involved_location_ids.push(d.id.clone());
        }
        HookSubject::Faction(f) => {
            hook.target_faction_id = Some(f.id.clone());
            hook.involved_faction_ids.push(f.id.clone());
        }
        HookSubject::Wilderness => {}
    }
    Ok(hook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::generate_factions;
    use crate::npc::{Archetype, NpcSpec, generate_npc};

    #[test]
    fn faction_hook_targets_faction() {
        let setups = generate_factions("hooks", 1, &[], &["settlement-a".into()]).unwrap();
        let faction = &setups[0].faction;
        let hook = generate_hook("hooks", HookSubject::Faction(faction), 0, &[]).unwrap();
        assert_eq!(hook.target_faction_id.as_ref(), Some(&faction.id));
        assert_eq!(hook.involved_faction_ids, vec![faction.id.clone()]);
        assert!(!hook.rumor.contains('{'));
        assert!(!hook.truth.contains('{'));
    }

    #[test]
    fn involved_npcs_come_from_input() {
        let mut rng = SeededRandom::new("hook-npcs");
        let npcs: Vec<Npc> = (0..4)
            .map(|_| generate_npc(&mut rng, NpcSpec::new(Archetype::Commoner, None, "loc")).unwrap())
            .collect();
        let refs: Vec<&Npc> = npcs.iter().collect();
        let hook = generate_hook("hooks", HookSubject::Wilderness, 3, &refs).unwrap();
        assert!((1..=2).contains(&hook.involved_npc_ids.len()));
        for id in &hook.involved_npc_ids {
            assert!(npcs.iter().any(|n| &n.id == id));
        }
        assert_eq!(hook.source_npc_id.as_ref(), hook.involved_npc_ids.first());
    }
}
