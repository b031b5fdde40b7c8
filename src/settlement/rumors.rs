//! Слухи и объявления поселения
//!
//! Слухи связывают поселение с остальным миром: крючками, ближайшими
//! подземельями, планами фракций и собственной бедой поселения.

use super::{Notice, NoticeKind, Rumor, SettlementSize, SiteKind, SpatialSettlement};
use crate::dungeon::SpatialDungeon;
use crate::error::Result;
use crate::faction::{Faction, Hook};
use crate::npc::{Archetype, Npc, NpcRole};
use crate::random::{SeededRandom, derive_seed};

const MAX_RUMORS: i32 = 8;

const GENERIC_SOURCES: &[&str] = &[
    "A drunk at the tavern",
    "Overheard at the market",
    "A nervous traveler",
    "Local gossip",
    "A dying stranger",
    "An unsigned note",
    "The temple beggar",
    "A merchant's warning",
];

const DUNGEON_LEADS: &[&str] = &[
    "Three travelers vanished on the road near {dungeon}. The only survivor babbled about {hint} before dying.",
    "An old map surfaced showing {dungeon}. The merchant who sold it was found dead the next morning.",
    "{dungeon} has been quiet for years, but lights were seen there last night. Torches. Moving deeper.",
    "A child went missing near {dungeon}. The search party found only strange tracks leading inside.",
];

const TROUBLE_TALK: &[&str] = &[
    "{trouble}. The council pretends everything's fine, but it's not.",
    "Three families left this week. All of them mentioned it: {trouble}.",
    "{trouble}. The guard won't act. Maybe outsiders could help.",
];

const INTRIGUE: &[&str] = &[
    "{faction} is offering good coin for information. No questions asked.",
    "Someone's been leaving the mark of {faction} around town. Recruiting, or warning.",
    "{faction} lost something valuable. They're not advertising, but they're searching hard.",
];

const DANGERS: &[&str] = &[
    "Whatever's in {dungeon} is waking up. The ground shakes at night now.",
    "Don't take the road past {dungeon}. Something's hunting travelers.",
    "Lock your doors when the fog rolls in. That's when {threat} comes out.",
];

const THREATS: &[&str] = &[
    "the thing in the woods",
    "whatever killed the miller",
    "the night hunters",
    "the howling",
];

const IDLE_TALK: &[&str] = &[
    "The harvest will be poor this year, mark my words.",
    "A stranger in a grey cloak paid for a room in gold and never came down.",
    "The old well is haunted. Everyone knows it.",
    "Prices at the market doubled overnight. Someone's hoarding.",
];

/// Всё, что нужно знать генератору слухов о мире вокруг поселения
#[derive(Debug, Clone)]
pub struct RumorContext<'a> {
    pub settlement: &'a SpatialSettlement,
    /// Жители поселения
    pub npcs: Vec<&'a Npc>,
    /// Подземелья, ближайшие первыми
    pub dungeons: Vec<&'a SpatialDungeon>,
    pub hooks: Vec<&'a Hook>,
    pub factions: Vec<&'a Faction>,
}

#[derive(Debug, Clone, Copy)]
enum RumorKind {
    DungeonLead,
    Trouble,
    Intrigue,
    Danger,
}

fn source(rng: &mut SeededRandom, ctx: &RumorContext<'_>) -> Result<String> {
    let sites: Vec<&str> = ctx
        .settlement
        .sites
        .iter()
        .filter(|s| s.rumor_source)
        .map(|s| s.name.as_str())
        .collect();
    if !sites.is_empty() && rng.chance(0.6) {
        return Ok(format!("Heard at {}", rng.pick(&sites)?));
    }
    Ok((*rng.pick(GENERIC_SOURCES)?).to_string())
}

fn rumor(
    rng: &mut SeededRandom,
    ctx: &RumorContext<'_>,
    text: String,
    is_true: bool,
) -> Result<Rumor> {
    Ok(Rumor {
        id: rng.id("rumor"),
        text,
        is_true,
        source: source(rng, ctx)?,
        linked_hook_id: None,
        target_location_id: None,
    })
}

fn nearest_dungeon<'a>(rng: &mut SeededRandom, ctx: &RumorContext<'a>) -> Result<&'a SpatialDungeon> {
    let close = &ctx.dungeons[..ctx.dungeons.len().min(3)];
    Ok(*rng.pick(close)?)
}

fn from_kind(rng: &mut SeededRandom, ctx: &RumorContext<'_>, kind: RumorKind) -> Result<Rumor> {
    match kind {
        RumorKind::DungeonLead => {
            let dungeon = nearest_dungeon(rng, ctx)?;
            let text = rng
                .pick(DUNGEON_LEADS)?
                .replace("{dungeon}", &dungeon.name)
                .replace("{hint}", rng.pick(dungeon.theme.hints())?);
            let mut r = rumor(rng, ctx, text, true)?;
            r.target_location_id = Some(dungeon.id.clone());
            Ok(r)
        }
        RumorKind::Trouble => {
            let text = rng
                .pick(TROUBLE_TALK)?
                .replace("{trouble}", &ctx.settlement.trouble);
            rumor(rng, ctx, text, true)
        }
        RumorKind::Intrigue => {
            let faction = *rng.pick(&ctx.factions)?;
            let text = rng.pick(INTRIGUE)?.replace("{faction}", &faction.name);
            let is_true = rng.chance(0.7);
            rumor(rng, ctx, text, is_true)
        }
        RumorKind::Danger => {
            let template = *rng.pick(DANGERS)?;
            let mut target = None;
            let mut text = template.replace("{threat}", rng.pick(THREATS)?);
            if text.contains("{dungeon}") {
                let dungeon = nearest_dungeon(rng, ctx)?;
                text = text.replace("{dungeon}", &dungeon.name);
                target = Some(dungeon.id.clone());
            }
            let is_true = rng.chance(0.8);
            let mut r = rumor(rng, ctx, text, is_true)?;
            r.target_location_id = target;
            Ok(r)
        }
    }
}

/// Генерирует слухи поселения
///
/// Порядок приоритетов: планы фракций, крючки, затем перемешанный набор
/// наводок на подземелья, беды поселения, интриг и угроз. Недостающее
/// добирается праздными разговорами, половина которых лжива.
pub fn generate_rumors(seed: &str, ctx: &RumorContext<'_>) -> Result<Vec<Rumor>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "rumors", &ctx.settlement.id));
    let target = rng.between(3, 6).min(MAX_RUMORS) as usize;
    let mut rumors = Vec::with_capacity(target);

    for faction in ctx.factions.iter().take(2) {
        if rumors.len() >= target {
            break;
        }
        if let Some(goal) = faction.next_goal() {
            let text = format!(
                "Word is {} means to {}.",
                faction.name,
                goal.description.to_lowercase()
            );
            rumors.push(rumor(&mut rng, ctx, text, true)?);
        }
    }

    let mut hooks = ctx.hooks.clone();
    rng.shuffle(&mut hooks);
    for hook in hooks.iter().take(2) {
        if rumors.len() >= target {
            break;
        }
        let mut r = rumor(&mut rng, ctx, hook.rumor.clone(), true)?;
        r.linked_hook_id = Some(hook.id.clone());
        r.target_location_id = hook.target_location_id.clone();
        rumors.push(r);
    }

    let mut kinds = vec![RumorKind::Trouble];
    if !ctx.dungeons.is_empty() {
        kinds.extend([RumorKind::DungeonLead, RumorKind::DungeonLead, RumorKind::Danger]);
    }
    if !ctx.factions.is_empty() {
        kinds.push(RumorKind::Intrigue);
    }
    rng.shuffle(&mut kinds);
    for kind in kinds {
        if rumors.len() >= target {
            break;
        }
        rumors.push(from_kind(&mut rng, ctx, kind)?);
    }

    while rumors.len() < target {
        let text = (*rng.pick(IDLE_TALK)?).to_string();
        let is_true = rng.chance(0.5);
        rumors.push(rumor(&mut rng, ctx, text, is_true)?);
    }
    Ok(rumors)
}

const TARGETS: &[&str] = &[
    "the bandit leader",
    "a notorious thief",
    "a pack of wolves",
    "goblin raiders",
    "escaped prisoners",
];
const TASKS: &[&str] = &[
    "Escort needed to the crossroads",
    "Investigate disappearances",
    "Retrieve stolen goods",
    "Guard the caravan",
];
const AUTHORITIES: &[&str] = &[
    "the Town Council",
    "the Guard Captain",
    "the High Priest",
    "the Guild Master",
];
const ANNOUNCEMENTS: &[&str] = &[
    "a festival will be held next moon",
    "the market tax has increased",
    "a curfew is now in place",
];
const GOODS: &[&str] = &["horses", "weapons", "supplies", "potions"];

fn notice_count(size: SettlementSize) -> usize {
    match size {
        SettlementSize::City => 4,
        SettlementSize::Town => 3,
        _ => 2,
    }
}

/// Кто мог бы повесить объявление от имени фракции
fn contact<'a>(
    rng: &mut SeededRandom,
    ctx: &RumorContext<'a>,
    faction: Option<&Faction>,
) -> Result<Option<&'a Npc>> {
    let members: Vec<&Npc> = ctx
        .npcs
        .iter()
        .copied()
        .filter(|n| faction.is_some_and(|f| n.faction_id.as_deref() == Some(f.id.as_str())))
        .collect();
    let innkeepers: Vec<&Npc> = ctx
        .npcs
        .iter()
        .copied()
        .filter(|n| n.role == Some(NpcRole::Innkeeper))
        .collect();
    let merchants: Vec<&Npc> = ctx
        .npcs
        .iter()
        .copied()
        .filter(|n| n.role == Some(NpcRole::Merchant) || n.archetype == Archetype::Merchant)
        .collect();

    for pool in [members, innkeepers, merchants, ctx.npcs.clone()] {
        if !pool.is_empty() {
            return Ok(Some(*rng.pick(&pool)?));
        }
    }
    Ok(None)
}

fn generic_notice(rng: &mut SeededRandom) -> Result<Notice> {
    const KINDS: [NoticeKind; 5] = [
        NoticeKind::Bounty,
        NoticeKind::Job,
        NoticeKind::Warning,
        NoticeKind::Announcement,
        NoticeKind::Request,
    ];
    let kind = *rng.pick(&KINDS)?;
    let (title, description, reward) = match kind {
        NoticeKind::Bounty => {
            let gold = rng.between(10, 100);
            (
                "WANTED",
                format!("{} - dead or alive.", rng.pick(TARGETS)?),
                Some(format!("{gold} gp")),
            )
        }
        NoticeKind::Job => ("HELP NEEDED", format!("{}. Inquire within.", rng.pick(TASKS)?), None),
        NoticeKind::Warning => (
            "WARNING",
            format!("{} reported on the roads.", rng.pick(TARGETS)?),
            None,
        ),
        NoticeKind::Announcement => (
            "PUBLIC NOTICE",
            format!(
                "By decree of {}: {}.",
                rng.pick(AUTHORITIES)?,
                rng.pick(ANNOUNCEMENTS)?
            ),
            None,
        ),
        NoticeKind::Request => (
            "SEEKING",
            format!("{} - will pay top coin.", rng.pick(GOODS)?),
            None,
        ),
    };
    Ok(Notice {
        id: rng.id("notice"),
        kind,
        title: title.to_string(),
        description,
        reward,
        poster_id: None,
        linked_hook_id: None,
    })
}

/// Генерирует объявления для доски объявлений
///
/// Без заведения с доской объявлений поселение объявлений не получает.
pub fn generate_notices(seed: &str, ctx: &RumorContext<'_>) -> Result<Vec<Notice>> {
    let settlement = ctx.settlement;
    let has_board = settlement
        .sites
        .iter()
        .any(|s| s.notice_board || s.kind == SiteKind::Market);
    if !has_board {
        return Ok(Vec::new());
    }

    let mut rng = SeededRandom::new(derive_seed(seed, "notices", &settlement.id));
    let count = notice_count(settlement.size);
    let mut notices = Vec::with_capacity(count);

    let local_hooks = ctx
        .hooks
        .iter()
        .filter(|h| h.source_settlement_id.as_deref() == Some(settlement.id.as_str()));
    for hook in local_hooks.take(1) {
        let poster = contact(&mut rng, ctx, None)?;
        notices.push(Notice {
            id: rng.id("notice"),
            kind: NoticeKind::Job,
            title: "ADVENTURERS SOUGHT".to_string(),
            description: format!("{}. Capable hands wanted.", hook.rumor),
            reward: Some(format!("{} gp", rng.between(20, 80))),
            poster_id: poster.map(|n| n.id.clone()),
            linked_hook_id: Some(hook.id.clone()),
        });
    }

    for faction in ctx.factions.iter().take(2) {
        if notices.len() >= count {
            break;
        }
        let Some(goal) = faction.next_goal() else {
            continue;
        };
        let poster = contact(&mut rng, ctx, Some(faction))?;
        let name = poster.map_or_else(
            || format!("a representative of {}", faction.name),
            |n| n.name.clone(),
        );
        let reward = if rng.chance(0.5) {
            Some(format!("{} gp", rng.between(30, 100)))
        } else {
            None
        };
        notices.push(Notice {
            id: rng.id("notice"),
            kind: NoticeKind::Request,
            title: "INFORMATION WANTED".to_string(),
            description: format!(
                "Information sought regarding efforts to {}. Contact {name}.",
                goal.description.to_lowercase()
            ),
            reward,
            poster_id: poster.map(|n| n.id.clone()),
            linked_hook_id: None,
        });
    }

    for faction in &ctx.factions {
        if notices.len() >= count {
            break;
        }
        if rng.chance(0.3) {
            notices.push(Notice {
                id: rng.id("notice"),
                kind: NoticeKind::Warning,
                title: "WARNING".to_string(),
                description: format!(
                    "Beware: {} agents have been spotted in the area. Report suspicious activity to the guard.",
                    faction.name
                ),
                reward: None,
                poster_id: None,
                linked_hook_id: None,
            });
        }
    }

    while notices.len() < count {
        notices.push(generic_notice(&mut rng)?);
    }
    Ok(notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;
    use crate::dungeon::{DungeonParams, DungeonSize, DungeonTheme, generate_dungeon};
    use crate::hex::{Hex, HexCoord, Terrain};
    use crate::settlement::generator::generate_settlement;

    fn village() -> SpatialSettlement {
        let hex = Hex::new(HexCoord::new(0, 0), Terrain::Plains);
        generate_settlement("rumors", &hex, Some(SettlementSize::Village)).unwrap()
    }

    #[test]
    fn rumors_without_world_still_fill() {
        let s = village();
        let ctx = RumorContext {
            settlement: &s,
            npcs: Vec::new(),
            dungeons: Vec::new(),
            hooks: Vec::new(),
            factions: Vec::new(),
        };
        let rumors = generate_rumors("rumors", &ctx).unwrap();
        assert!((3..=6).contains(&rumors.len()));
        assert!(rumors.iter().all(|r| r.target_location_id.is_none()));
    }

    #[test]
    fn dungeon_rumors_point_at_known_dungeons() {
        let s = village();
        let hex = Hex::new(HexCoord::new(1, 0), Terrain::Hills);
        let params = DungeonParams::new(DungeonTheme::Mine, DungeonSize::Lair);
        let d = generate_dungeon("rumors", &params, &hex, &BuiltinData).unwrap();
        let ctx = RumorContext {
            settlement: &s,
            npcs: Vec::new(),
            dungeons: vec![&d],
            hooks: Vec::new(),
            factions: Vec::new(),
        };
        for seed in ["a", "b", "c", "d"] {
            for r in generate_rumors(seed, &ctx).unwrap() {
                if let Some(target) = &r.target_location_id {
                    assert_eq!(target, &d.id);
                }
            }
        }
    }

    #[test]
    fn notices_require_a_board() {
        let mut s = village();
        for site in &mut s.sites {
            site.notice_board = false;
            site.kind = SiteKind::Tavern;
        }
        let ctx = RumorContext {
            settlement: &s,
            npcs: Vec::new(),
            dungeons: Vec::new(),
            hooks: Vec::new(),
            factions: Vec::new(),
        };
        assert!(generate_notices("notices", &ctx).unwrap().is_empty());
    }
}
