//! Неигровые персонажи

use crate::error::Result;
use crate::random::SeededRandom;
use crate::table::Keyed;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Commoner,
    Bandit,
    Guard,
    Knight,
    Assassin,
    Witch,
    Priest,
    Noble,
    Merchant,
    Scholar,
    Thief,
    Cultist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcRole {
    Mayor,
    Elder,
    Innkeeper,
    Shopkeeper,
    Blacksmith,
    Priest,
    GuardCaptain,
    Farmer,
    Merchant,
    Craftsman,
    Healer,
    Sage,
    Beggar,
    Criminal,
    Noble,
    /// Глава фракции
    Leader,
    /// Вожак соперничающего отряда искателей приключений
    Adventurer,
    Prisoner,
    Hermit,
    Ghost,
}

/// Отношение к партии при встрече
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Hostile,
    Neutral,
    Friendly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcStatus {
    #[default]
    Alive,
    Dead,
    Missing,
    Captured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<NpcRole>,
    pub age: u32,
    /// Локация, к которой привязан персонаж
    pub location_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    /// Комната подземелья, где персонажа можно встретить
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
    /// Что персонаж может рассказать
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub status: NpcStatus,
}

impl Keyed for Npc {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aldric", "Brynn", "Cedric", "Dara", "Elric", "Fiona", "Gareth", "Helena", "Ivar", "Jenna",
    "Kael", "Lyra", "Magnus", "Nadia", "Orin", "Petra", "Quinn", "Rowan", "Silas", "Thalia",
    "Ulric", "Vera", "Willem", "Yorick", "Zara", "Brom", "Cora", "Dorian",
];

const LAST_NAMES: &[&str] = &[
    "Blackwood", "Stoneheart", "Ironforge", "Shadowmere", "Brightwater", "Thornwood", "Stormwind",
    "Goldmane", "Silverton", "Ravencrest", "Oakenshield", "Frostborn", "Nightingale", "Greymoor",
];

const SECRETS: &[&str] = &[
    "Is secretly a spy for another faction",
    "Owes a large debt to dangerous people",
    "Witnessed a murder and told no one",
    "Has a hidden stash of stolen goods",
    "Is not who they claim to be",
    "Knows the location of a lost treasure",
    "Is being blackmailed",
    "Has the key to an ancient secret",
];

/// Заготовка персонажа: всё, кроме привязок к локации
pub struct NpcSpec {
    pub archetype: Archetype,
    pub role: Option<NpcRole>,
    pub age: (i32, i32),
    pub location_id: String,
}

impl NpcSpec {
    #[must_use]
    pub fn new(archetype: Archetype, role: Option<NpcRole>, location_id: &str) -> Self {
        Self {
            archetype,
            role,
            age: (18, 70),
            location_id: location_id.to_string(),
        }
    }

    #[must_use]
    pub fn aged(mut self, min: i32, max: i32) -> Self {
        self.age = (min, max);
        self
    }
}

/// Создаёт персонажа; с вероятностью 20% у него есть тайна
pub fn generate_npc(rng: &mut SeededRandom, spec: NpcSpec) -> Result<Npc> {
    let name = format!("{} {}", rng.pick(FIRST_NAMES)?, rng.pick(LAST_NAMES)?);
    let age = rng.between(spec.age.0, spec.age.1) as u32;
    let secret = if rng.chance(0.2) {
        Some((*rng.pick(SECRETS)?).to_string())
    } else {
        None
    };
    Ok(Npc {
        id: rng.id("npc"),
        name,
        archetype: spec.archetype,
        role: spec.role,
        age,
        location_id: spec.location_id,
        faction_id: None,
        site_id: None,
        building_id: None,
        room_id: None,
        disposition: None,
        knows: None,
        secret,
        status: NpcStatus::Alive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npc_respects_age_range() {
        let mut rng = SeededRandom::new("npc");
        for _ in 0..20 {
            let spec = NpcSpec::new(Archetype::Noble, Some(NpcRole::Mayor), "loc-1").aged(45, 70);
            let npc = generate_npc(&mut rng, spec).unwrap();
            assert!((45..=70).contains(&npc.age));
            assert_eq!(npc.location_id, "loc-1");
            assert!(npc.id.starts_with("npc-"));
        }
    }
}
