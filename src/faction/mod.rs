//! Фракции, крючки приключений и часы прогресса

pub mod generator;
pub mod hooks;

use crate::table::Keyed;
use serde::{Deserialize, Serialize};

pub use generator::{FactionSetup, generate_faction_clock, generate_factions};
pub use hooks::{HookSubject, generate_hook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionArchetype {
    Criminal,
    Religious,
    Political,
    Mercantile,
    Military,
    Arcane,
    Tribal,
    Monstrous,
    Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaGoal {
    pub description: String,
    #[serde(default)]
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionStatus {
    #[default]
    Active,
    Triumphant,
    Disbanded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub archetype: FactionArchetype,
    pub purpose: String,
    /// Подземелье-логово
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lair_id: Option<String>,
    /// Поселение-штаб
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters_id: Option<String>,
    #[serde(default)]
    pub territory_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    pub objective: String,
    #[serde(default)]
    pub agenda: Vec<AgendaGoal>,
    #[serde(default)]
    pub status: FactionStatus,
}

impl Faction {
    /// Отмечает следующую невыполненную цель повестки.
    /// Возвращает её описание; когда целей не осталось, фракция торжествует.
    pub fn complete_next_goal(&mut self) -> Option<String> {
        let goal = self
            .agenda
            .iter_mut()
            .find(|g| g.status == GoalStatus::Pending)?;
        goal.status = GoalStatus::Completed;
        let description = goal.description.clone();
        if self.agenda.iter().all(|g| g.status == GoalStatus::Completed) {
            self.status = FactionStatus::Triumphant;
        }
        Some(description)
    }

    #[must_use]
    pub fn next_goal(&self) -> Option<&AgendaGoal> {
        self.agenda.iter().find(|g| g.status == GoalStatus::Pending)
    }
}

impl Keyed for Faction {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Mystery,
    Rescue,
    Threat,
    Treasure,
    Intrigue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    #[default]
    Available,
    Active,
    Completed,
    Failed,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HookKind,
    pub rumor: String,
    pub truth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_settlement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_npc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_faction_id: Option<String>,
    #[serde(default)]
    pub involved_npc_ids: Vec<String>,
    #[serde(default)]
    pub involved_location_ids: Vec<String>,
    #[serde(default)]
    pub involved_faction_ids: Vec<String>,
    #[serde(default)]
    pub status: HookStatus,
}

impl Keyed for Hook {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Владелец часов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ClockOwner {
    Faction(String),
    Npc(String),
    World,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockTrigger {
    /// Деление заполняется раз в `days_per_tick` дней
    Time { days_per_tick: u32 },
    Event { events: Vec<String> },
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceKind {
    Event,
    StateChange,
    Spawn,
    Destroy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    pub description: String,
    pub kind: ConsequenceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub id: String,
    pub name: String,
    pub description: String,
    pub segments: u32,
    pub filled: u32,
    pub owner: ClockOwner,
    pub trigger: ClockTrigger,
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub paused: bool,
    /// День заполнения последнего деления
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<u32>,
}

impl Clock {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_on.is_some()
    }

    /// Заполняет деления; `true`, если часы завершились именно сейчас
    pub fn advance(&mut self, segments: u32, day: u32) -> bool {
        if self.paused || self.is_complete() {
            return false;
        }
        self.filled = (self.filled + segments).min(self.segments);
        if self.filled >= self.segments {
            self.completed_on = Some(day);
            return true;
        }
        false
    }
}

impl Keyed for Clock {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(segments: u32) -> Clock {
        Clock {
            id: "clock-1".into(),
            name: "Rising Tension".into(),
            description: String::new(),
            segments,
            filled: 0,
            owner: ClockOwner::World,
            trigger: ClockTrigger::Time { days_per_tick: 5 },
            consequences: Vec::new(),
            visible: true,
            paused: false,
            completed_on: None,
        }
    }

    #[test]
    fn clock_completes_at_cap() {
        let mut c = clock(2);
        assert!(!c.advance(1, 5));
        assert!(c.advance(3, 10));
        assert_eq!(c.filled, 2);
        assert_eq!(c.completed_on, Some(10));
        assert!(!c.advance(1, 15));
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut c = clock(4);
        c.paused = true;
        assert!(!c.advance(1, 1));
        assert_eq!(c.filled, 0);
    }

    #[test]
    fn goals_complete_in_order() {
        let mut f = Faction {
            id: "faction-1".into(),
            name: "The Veil".into(),
            archetype: FactionArchetype::Secret,
            purpose: String::new(),
            lair_id: None,
            headquarters_id: None,
            territory_ids: Vec::new(),
            leader_id: None,
            objective: String::new(),
            agenda: vec![
                AgendaGoal {
                    description: "first".into(),
                    status: GoalStatus::Pending,
                },
                AgendaGoal {
                    description: "second".into(),
                    status: GoalStatus::Pending,
                },
            ],
            status: FactionStatus::Active,
        };
        assert_eq!(f.complete_next_goal().as_deref(), Some("first"));
        assert_eq!(f.status, FactionStatus::Active);
        assert_eq!(f.complete_next_goal().as_deref(), Some("second"));
        assert_eq!(f.status, FactionStatus::Triumphant);
        assert!(f.complete_next_goal().is_none());
    }

    #[test]
    fn clock_trigger_serializes_tagged() {
        let json = serde_json::to_string(&ClockTrigger::Time { days_per_tick: 7 }).unwrap();
        assert_eq!(json, r#"{"type":"time","days_per_tick":7}"#);
    }
}
