pub mod calendar;
pub mod config;
pub mod data;
pub mod dungeon;
pub mod error;
pub mod faction;
pub mod hex;
pub mod landmark;
pub mod npc;
pub mod random;
pub mod settlement;
pub mod table;
pub mod terrain;
pub mod world;

pub use calendar::{advance_day, advance_days};
pub use config::{ConfigError, GenerationParams, TerrainSettings};
pub use data::{BuiltinData, DataSource};
pub use dungeon::{
    DungeonKey, DungeonParams, DungeonSize, DungeonTheme, SpatialDungeon, generate_dungeon,
    generate_dungeon_npcs, place_dungeon,
};
pub use error::{GenError, Result};
pub use hex::{Hex, HexCoord, Terrain};
pub use random::{SeededRandom, derive_seed};
pub use settlement::{SettlementSize, SpatialSettlement, place_settlement};
pub use world::{
    Location, RegenTarget, Regeneration, WorldData, check_integrity, clear_location,
    generate_world, regenerate,
};
