//! Календарь кампании: смена дней, сезонов, фаз луны и погоды
//!
//! Продвижение дня не создаёт и не удаляет локации и персонажей. Меняется
//! только скалярное состояние мира, часы и повестки фракций.

use crate::faction::{ClockOwner, ClockTrigger};
use crate::random::{SeededRandom, derive_seed};
use crate::world::WorldData;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DAYS_PER_SEASON: u32 = 90;
pub const DAYS_PER_YEAR: u32 = DAYS_PER_SEASON * 4;
pub const LUNAR_CYCLE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    const ORDER: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Сезон дня (дни считаются с 1)
    #[must_use]
    pub fn for_day(day: u32) -> Self {
        let index = (day.saturating_sub(1) / DAYS_PER_SEASON) % 4;
        Self::ORDER[index as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    #[default]
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    const ORDER: [MoonPhase; 8] = [
        MoonPhase::New,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::Full,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Фаза луны дня: по четыре дня на фазу
    #[must_use]
    pub fn for_day(day: u32) -> Self {
        let index = (day.saturating_sub(1) % LUNAR_CYCLE) / (LUNAR_CYCLE / 8);
        Self::ORDER[index as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Overcast,
    Rain,
    Storm,
    Fog,
    Snow,
    Heatwave,
}

/// Веса погоды по сезонам
fn weather_table(season: Season) -> &'static [(Weather, u32)] {
    match season {
        Season::Spring => &[
            (Weather::Clear, 30),
            (Weather::Overcast, 25),
            (Weather::Rain, 30),
            (Weather::Storm, 5),
            (Weather::Fog, 10),
        ],
        Season::Summer => &[
            (Weather::Clear, 45),
            (Weather::Overcast, 15),
            (Weather::Rain, 15),
            (Weather::Storm, 10),
            (Weather::Heatwave, 15),
        ],
        Season::Autumn => &[
            (Weather::Clear, 20),
            (Weather::Overcast, 30),
            (Weather::Rain, 25),
            (Weather::Storm, 10),
            (Weather::Fog, 15),
        ],
        Season::Winter => &[
            (Weather::Clear, 20),
            (Weather::Overcast, 30),
            (Weather::Snow, 35),
            (Weather::Storm, 5),
            (Weather::Fog, 10),
        ],
    }
}

/// Событие дня в журнале календаря
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DayEvent {
    WeatherChanged {
        weather: Weather,
    },
    SeasonChanged {
        season: Season,
    },
    ClockTicked {
        clock_id: String,
        filled: u32,
        segments: u32,
    },
    ClockCompleted {
        clock_id: String,
        consequences: Vec<String>,
    },
    GoalCompleted {
        faction_id: String,
        goal: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    #[serde(default)]
    pub events: Vec<DayEvent>,
}

/// Скалярное состояние мира
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub day: u32,
    pub season: Season,
    pub year: u32,
    pub weather: Weather,
    pub moon: MoonPhase,
    /// Последний день кампании
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_day: Option<u32>,
    #[serde(default)]
    pub log: Vec<DayRecord>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            day: 1,
            season: Season::Spring,
            year: 1,
            weather: Weather::Clear,
            moon: MoonPhase::New,
            end_day: None,
            log: Vec::new(),
        }
    }
}

/// Продвигает мир на один день
///
/// Возвращает `None`, если достигнут последний день кампании.
#[must_use]
pub fn advance_day(world: &WorldData) -> Option<WorldData> {
    if world.state.end_day.is_some_and(|end| world.state.day >= end) {
        return None;
    }
    let mut next = world.clone();
    let day = world.state.day + 1;
    let mut events = Vec::new();

    let state = &mut next.state;
    state.day = day;
    state.year = 1 + (day - 1) / DAYS_PER_YEAR;
    state.moon = MoonPhase::for_day(day);
    let season = Season::for_day(day);
    if season != state.season {
        state.season = season;
        events.push(DayEvent::SeasonChanged { season });
    }

    let mut rng = SeededRandom::new(derive_seed(&world.seed, "weather", day));
    let weather = rng
        .pick_weighted(weather_table(season))
        .map_or(state.weather, |w| *w);
    if weather != state.weather {
        state.weather = weather;
        events.push(DayEvent::WeatherChanged { weather });
    }

    let mut finished_factions = Vec::new();
    for clock in next.clocks.iter_mut() {
        let ClockTrigger::Time { days_per_tick } = clock.trigger else {
            continue;
        };
        if days_per_tick == 0 || day % days_per_tick != 0 || clock.paused || clock.is_complete() {
            continue;
        }
        let completed = clock.advance(1, day);
        events.push(DayEvent::ClockTicked {
            clock_id: clock.id.clone(),
            filled: clock.filled,
            segments: clock.segments,
        });
        if completed {
            events.push(DayEvent::ClockCompleted {
                clock_id: clock.id.clone(),
                consequences: clock
                    .consequences
                    .iter()
                    .map(|c| c.description.clone())
                    .collect(),
            });
            if let ClockOwner::Faction(faction_id) = &clock.owner {
                finished_factions.push(faction_id.clone());
            }
        }
    }

    for faction_id in finished_factions {
        let Some(faction) = next.factions.get_mut(&faction_id) else {
            continue;
        };
        if let Some(goal) = faction.complete_next_goal() {
            events.push(DayEvent::GoalCompleted { faction_id, goal });
        }
    }

    debug!(day, events = events.len(), "день продвинут");
    next.state.log.push(DayRecord { day, events });
    Some(next)
}

/// Продвигает мир на `days` дней или до конца кампании
#[must_use]
pub fn advance_days(world: &WorldData, days: u32) -> WorldData {
    let mut current = world.clone();
    for _ in 0..days {
        match advance_day(&current) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_and_years_roll_over() {
        assert_eq!(Season::for_day(1), Season::Spring);
        assert_eq!(Season::for_day(90), Season::Spring);
        assert_eq!(Season::for_day(91), Season::Summer);
        assert_eq!(Season::for_day(271), Season::Winter);
        assert_eq!(Season::for_day(361), Season::Spring);
    }

    #[test]
    fn moon_cycles_every_32_days() {
        assert_eq!(MoonPhase::for_day(1), MoonPhase::New);
        assert_eq!(MoonPhase::for_day(5), MoonPhase::WaxingCrescent);
        assert_eq!(MoonPhase::for_day(17), MoonPhase::Full);
        assert_eq!(MoonPhase::for_day(33), MoonPhase::New);
    }

    #[test]
    fn end_day_stops_the_calendar() {
        let mut world = WorldData::empty("w", "Test", "calendar");
        world.state.end_day = Some(2);
        let next = advance_day(&world).unwrap();
        assert_eq!(next.state.day, 2);
        assert!(advance_day(&next).is_none());
        assert_eq!(advance_days(&world, 10).state.day, 2);
    }

    #[test]
    fn year_follows_day() {
        let mut world = WorldData::empty("w", "Test", "calendar");
        world.state.day = DAYS_PER_YEAR;
        world.state.season = Season::Winter;
        let next = advance_day(&world).unwrap();
        assert_eq!(next.state.year, 2);
        assert_eq!(next.state.season, Season::Spring);
        assert!(
            next.state.log[0]
                .events
                .contains(&DayEvent::SeasonChanged { season: Season::Spring })
        );
    }
}
