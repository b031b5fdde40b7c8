use super::{
    AgendaGoal, Clock, ClockOwner, ClockTrigger, Consequence, ConsequenceKind, Faction,
    FactionArchetype, FactionStatus, GoalStatus,
};
use crate::error::Result;
use crate::npc::{Archetype, Npc, NpcRole, NpcSpec, generate_npc};
use crate::random::{SeededRandom, derive_seed};
use tracing::debug;

const ARCHETYPE_WEIGHTS: [(FactionArchetype, u32); 9] = [
    (FactionArchetype::Criminal, 20),
    (FactionArchetype::Religious, 15),
    (FactionArchetype::Political, 10),
    (FactionArchetype::Mercantile, 15),
    (FactionArchetype::Military, 15),
    (FactionArchetype::Arcane, 10),
    (FactionArchetype::Tribal, 5),
    (FactionArchetype::Monstrous, 5),
    (FactionArchetype::Secret, 5),
];

const PREFIXES: &[&str] = &[
    "The",
    "Order of the",
    "Brotherhood of the",
    "Circle of the",
    "Guild of the",
    "Cult of the",
    "Sons of the",
];

struct AgendaTemplate {
    objective: &'static str,
    goals: &'static [&'static str],
}

enum TemplateTrigger {
    Days(u32),
    Events(&'static [&'static str]),
}

struct ClockTemplate {
    name: &'static str,
    description: &'static str,
    segments: u32,
    trigger: TemplateTrigger,
    consequences: &'static [(&'static str, ConsequenceKind)],
}

struct ArchetypeTables {
    nouns: &'static [&'static str],
    purposes: &'static [&'static str],
    leaders: &'static [Archetype],
    /// Вероятность логова в глуши вместо штаба в поселении
    lair_chance: f64,
    agendas: &'static [AgendaTemplate],
    clocks: &'static [ClockTemplate],
}

#[allow(clippy::too_many_lines)]
fn tables(archetype: FactionArchetype) -> ArchetypeTables {
    use ConsequenceKind::{Destroy, Event, Spawn, StateChange};
    match archetype {
        FactionArchetype::Criminal => ArchetypeTables {
            nouns: &["Shadow", "Night", "Blade", "Serpent", "Raven", "Viper", "Dagger"],
            purposes: &[
                "controlling smuggling operations",
                "running protection rackets",
                "gathering secrets",
            ],
            leaders: &[Archetype::Bandit, Archetype::Thief, Archetype::Assassin],
            lair_chance: 0.3,
            agendas: &[AgendaTemplate {
                objective: "Control the underworld",
                goals: &[
                    "Eliminate the current crime boss",
                    "Unite the street gangs under one banner",
                    "Corrupt the city guard",
                    "Establish monopoly on smuggling",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Expanding Operations",
                description: "The gang is expanding their territory",
                segments: 6,
                trigger: TemplateTrigger::Days(7),
                consequences: &[
                    ("Controls a new district", StateChange),
                    ("Gains resources and recruits", Event),
                ],
            }],
        },
        FactionArchetype::Religious => ArchetypeTables {
            nouns: &["Dawn", "Light", "Flame", "Radiance", "Truth", "Redemption"],
            purposes: &[
                "conducting dark rituals",
                "worshipping forbidden gods",
                "converting the faithless",
            ],
            leaders: &[Archetype::Priest, Archetype::Cultist],
            lair_chance: 0.5,
            agendas: &[AgendaTemplate {
                objective: "Bring about the prophecy",
                goals: &[
                    "Recover the sacred relics",
                    "Convert the unbelievers",
                    "Purify the holy site",
                    "Perform the grand ritual",
                ],
            }],
            clocks: &[
                ClockTemplate {
                    name: "Grand Ritual",
                    description: "Preparing for a powerful ceremony",
                    segments: 8,
                    trigger: TemplateTrigger::Events(&[
                        "holy_day",
                        "sacrifice_offered",
                        "artifact_acquired",
                    ]),
                    consequences: &[
                        ("Divine intervention occurs", Spawn),
                        ("Faith spreads across region", StateChange),
                    ],
                },
                ClockTemplate {
                    name: "Crusade",
                    description: "Gathering forces for a holy war",
                    segments: 6,
                    trigger: TemplateTrigger::Days(14),
                    consequences: &[
                        ("Religious army marches", Event),
                        ("War declared on heretics", StateChange),
                    ],
                },
            ],
        },
        FactionArchetype::Political => ArchetypeTables {
            nouns: &["Crown", "Throne", "Council", "Banner", "Iron", "Gold"],
            purposes: &["seizing the throne", "brokering alliances", "defending the realm"],
            leaders: &[Archetype::Noble, Archetype::Knight],
            lair_chance: 0.1,
            agendas: &[AgendaTemplate {
                objective: "Seize the throne",
                goals: &[
                    "Discredit the current ruler",
                    "Win key noble houses to our cause",
                    "Secure military support",
                    "Stage the coup",
                    "Eliminate remaining loyalists",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Coup Planning",
                description: "Scheming to seize power",
                segments: 6,
                trigger: TemplateTrigger::Days(7),
                consequences: &[
                    ("Government overthrown", Event),
                    ("New ruler takes power", StateChange),
                ],
            }],
        },
        FactionArchetype::Mercantile => ArchetypeTables {
            nouns: &["Coin", "Scale", "Fortune", "Trade", "Silver", "Road"],
            purposes: &["monopolizing trade", "protecting trade routes", "hoarding wealth"],
            leaders: &[Archetype::Merchant, Archetype::Noble],
            lair_chance: 0.1,
            agendas: &[AgendaTemplate {
                objective: "Achieve trade monopoly",
                goals: &[
                    "Eliminate the competition",
                    "Secure exclusive contracts",
                    "Control the trade routes",
                    "Install guild leadership",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Monopoly Formation",
                description: "Buying out all competition",
                segments: 8,
                trigger: TemplateTrigger::Days(7),
                consequences: &[
                    ("Complete market control", StateChange),
                    ("Prices increase dramatically", Event),
                ],
            }],
        },
        FactionArchetype::Military => ArchetypeTables {
            nouns: &["Sword", "Shield", "Lance", "Steel", "Hammer", "Valor"],
            purposes: &["hunting monsters", "defending the realm", "training warriors"],
            leaders: &[Archetype::Knight, Archetype::Guard],
            lair_chance: 0.3,
            agendas: &[AgendaTemplate {
                objective: "Defend against the invasion",
                goals: &[
                    "Rally the defenders",
                    "Fortify key positions",
                    "Strike at enemy supply lines",
                    "Break the siege",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Fortification",
                description: "Building defenses",
                segments: 6,
                trigger: TemplateTrigger::Days(10),
                consequences: &[
                    ("Stronghold completed", Spawn),
                    ("Region becomes defensible", StateChange),
                ],
            }],
        },
        FactionArchetype::Arcane => ArchetypeTables {
            nouns: &["Rune", "Sigil", "Star", "Void", "Crystal"],
            purposes: &["advancing arcane research", "hoarding forbidden lore"],
            leaders: &[Archetype::Witch, Archetype::Scholar],
            lair_chance: 0.6,
            agendas: &[AgendaTemplate {
                objective: "Open the portal",
                goals: &[
                    "Locate the nexus point",
                    "Acquire the key artifact",
                    "Neutralize the wards",
                    "Perform the binding ritual",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Forbidden Research",
                description: "Unlocking dangerous secrets",
                segments: 6,
                trigger: TemplateTrigger::Events(&[
                    "artifact_found",
                    "tome_deciphered",
                    "experiment_success",
                ]),
                consequences: &[
                    ("Breakthrough achieved", Event),
                    ("New magic unleashed", Spawn),
                ],
            }],
        },
        FactionArchetype::Tribal => ArchetypeTables {
            nouns: &["Bear", "Wolf", "Elk", "Storm", "Thunder"],
            purposes: &["claiming ancestral lands", "raiding settlements"],
            leaders: &[Archetype::Commoner, Archetype::Bandit],
            lair_chance: 0.8,
            agendas: &[AgendaTemplate {
                objective: "Reclaim ancestral lands",
                goals: &[
                    "Unite the scattered clans",
                    "Drive out the settlers",
                    "Restore the sacred sites",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Migration",
                description: "Moving to new lands",
                segments: 4,
                trigger: TemplateTrigger::Days(7),
                consequences: &[
                    ("Tribe settles new territory", StateChange),
                    ("Old lands abandoned", Destroy),
                ],
            }],
        },
        FactionArchetype::Monstrous => ArchetypeTables {
            nouns: &["Fang", "Claw", "Blood", "Bone", "Horror"],
            purposes: &["spreading corruption", "feeding the brood"],
            leaders: &[Archetype::Bandit, Archetype::Cultist],
            lair_chance: 0.9,
            agendas: &[AgendaTemplate {
                objective: "Spread corruption",
                goals: &[
                    "Establish breeding grounds",
                    "Poison the water sources",
                    "Overwhelm isolated settlements",
                    "March on the cities",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Spawning Cycle",
                description: "Breeding more creatures",
                segments: 4,
                trigger: TemplateTrigger::Days(5),
                consequences: &[
                    ("Population explosion", Spawn),
                    ("Monster raids increase", Event),
                ],
            }],
        },
        FactionArchetype::Secret => ArchetypeTables {
            nouns: &["Veil", "Mask", "Whisper", "Echo", "Silence"],
            purposes: &["gathering secrets", "pulling strings from the shadows"],
            leaders: &[Archetype::Assassin, Archetype::Cultist, Archetype::Scholar],
            lair_chance: 0.5,
            agendas: &[AgendaTemplate {
                objective: "Achieve the grand design",
                goals: &[
                    "Place agents in positions of power",
                    "Manipulate events from the shadows",
                    "Acquire the final piece",
                    "Execute the master plan",
                ],
            }],
            clocks: &[ClockTemplate {
                name: "Infiltration Complete",
                description: "Placing agents in positions of power",
                segments: 6,
                trigger: TemplateTrigger::Days(7),
                consequences: &[
                    ("Key positions compromised", StateChange),
                    ("Secret control established", Event),
                ],
            }],
        },
    }
}

/// Фракция вместе с лидером и часами её плана
#[derive(Debug, Clone)]
pub struct FactionSetup {
    pub faction: Faction,
    pub leader: Option<Npc>,
    pub clock: Clock,
}

/// Часы фракции по шаблону её архетипа
pub fn generate_faction_clock(seed: &str, faction: &Faction) -> Result<Clock> {
    let mut rng = SeededRandom::new(derive_seed(seed, "clock", &faction.id));
    let template = rng.pick(tables(faction.archetype).clocks)?;
    let trigger = match template.trigger {
        TemplateTrigger::Days(days_per_tick) => ClockTrigger::Time { days_per_tick },
        TemplateTrigger::Events(events) => ClockTrigger::Event {
            events: events.iter().map(ToString::to_string).collect(),
        },
    };
    Ok(Clock {
        id: rng.id("clock"),
        name: format!("{}: {}", faction.name, template.name),
        description: format!(
            "{} is {}",
            faction.name,
            template.description.to_lowercase()
        ),
        segments: template.segments,
        filled: 0,
        owner: ClockOwner::Faction(faction.id.clone()),
        trigger,
        consequences: template
            .consequences
            .iter()
            .map(|&(description, kind)| Consequence {
                description: description.to_string(),
                kind,
            })
            .collect(),
        visible: rng.chance(0.7),
        paused: false,
        completed_on: None,
    })
}

/// Генерирует фракции и распределяет их по базам
///
/// Каждая фракция получает либо логово из `lair_ids`, либо штаб в одном из
/// `settlement_ids`; одна база не достаётся двум фракциям. Лидер появляется
/// только у фракции с базой, так как персонаж всегда привязан к локации.
pub fn generate_factions(
    seed: &str,
    count: usize,
    lair_ids: &[String],
    settlement_ids: &[String],
) -> Result<Vec<FactionSetup>> {
    let mut claimed: Vec<String> = Vec::new();
    let mut setups = Vec::with_capacity(count);

    for i in 0..count {
        let mut rng = SeededRandom::new(derive_seed(seed, "faction", i));
        let archetype = *rng.pick_weighted(&ARCHETYPE_WEIGHTS)?;
        let t = tables(archetype);
        let name = format!("{} {}", rng.pick(PREFIXES)?, rng.pick(t.nouns)?);
        let purpose = (*rng.pick(t.purposes)?).to_string();
        let agenda = rng.pick(t.agendas)?;
        let id = rng.id("faction");

        let free_lairs: Vec<&String> = lair_ids.iter().filter(|l| !claimed.contains(l)).collect();
        let free_towns: Vec<&String> = settlement_ids
            .iter()
            .filter(|s| !claimed.contains(s))
            .collect();

        // Без подходящей базы берётся любая свободная
        let wants_lair = rng.chance(t.lair_chance);
        let use_lair = !free_lairs.is_empty() && (wants_lair || free_towns.is_empty());
        let (lair_id, headquarters_id) = if use_lair {
            (Some((*rng.pick(&free_lairs)?).clone()), None)
        } else if free_towns.is_empty() {
            (None, None)
        } else {
            (None, Some((*rng.pick(&free_towns)?).clone()))
        };
        claimed.extend(lair_id.iter().chain(headquarters_id.iter()).cloned());

        let leader = match lair_id.as_ref().or(headquarters_id.as_ref()) {
            Some(base) => {
                let archetype = *rng.pick(t.leaders)?;
                let mut npc_rng = rng.derive("leader", &id);
                let mut npc = generate_npc(
                    &mut npc_rng,
                    NpcSpec::new(archetype, Some(NpcRole::Leader), base).aged(30, 65),
                )?;
                npc.faction_id = Some(id.clone());
                Some(npc)
            }
            None => None,
        };

        let faction = Faction {
            id,
            name,
            archetype,
            purpose,
            territory_ids: headquarters_id.iter().cloned().collect(),
            lair_id,
            headquarters_id,
            leader_id: leader.as_ref().map(|n| n.id.clone()),
            objective: agenda.objective.to_string(),
            agenda: agenda
                .goals
                .iter()
                .map(|g| AgendaGoal {
                    description: (*g).to_string(),
                    status: GoalStatus::Pending,
                })
                .collect(),
            status: FactionStatus::Active,
        };
        let clock = generate_faction_clock(seed, &faction)?;
        debug!(id = %faction.id, name = %faction.name, "фракция сгенерирована");
        setups.push(FactionSetup {
            faction,
            leader,
            clock,
        });
    }
    Ok(setups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}-{i}")).collect()
    }

    #[test]
    fn bases_are_never_shared() {
        let lairs = ids("dungeon", 2);
        let towns = ids("settlement", 2);
        let setups = generate_factions("bases", 6, &lairs, &towns).unwrap();
        let mut bases: Vec<&String> = setups
            .iter()
            .filter_map(|s| s.faction.lair_id.as_ref().or(s.faction.headquarters_id.as_ref()))
            .collect();
        let total = bases.len();
        bases.sort();
        bases.dedup();
        assert_eq!(bases.len(), total);
        assert_eq!(total, 4);
    }

    #[test]
    fn leader_lives_at_faction_base() {
        let setups = generate_factions("leader", 3, &ids("dungeon", 3), &ids("settlement", 3)).unwrap();
        for s in &setups {
            let leader = s.leader.as_ref().unwrap();
            let base = s.faction.lair_id.as_ref().or(s.faction.headquarters_id.as_ref()).unwrap();
            assert_eq!(&leader.location_id, base);
            assert_eq!(leader.faction_id.as_ref(), Some(&s.faction.id));
            assert_eq!(s.faction.leader_id.as_ref(), Some(&leader.id));
            assert_eq!(s.clock.owner, ClockOwner::Faction(s.faction.id.clone()));
        }
    }

    #[test]
    fn baseless_faction_has_no_leader() {
        let setups = generate_factions("homeless", 2, &[], &[]).unwrap();
        assert!(setups.iter().all(|s| s.leader.is_none()));
    }
}
