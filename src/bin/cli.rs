use clap::{Parser, Subcommand, ValueEnum};
use hexbinder::landmark::LandmarkKind;
use hexbinder::{
    BuiltinData, DungeonParams, DungeonSize, DungeonTheme, GenerationParams, Hex, HexCoord,
    RegenTarget, SettlementSize, Terrain, WorldData, advance_days, generate_dungeon,
    generate_world, regenerate,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Генератор мира для гексовой кампании
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Сгенерировать мир по конфигурации TOML
    Generate {
        /// Путь к конфигурационному файлу (по умолчанию встроенные параметры)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Переопределить сид из конфигурации
        #[arg(short, long)]
        seed: Option<String>,

        #[arg(short, long, default_value = "world.json")]
        output: PathBuf,
    },
    /// Перегенерировать один гекс мира
    Regenerate {
        #[arg(short, long)]
        world: PathBuf,

        /// Координата гекса `q,r`
        #[arg(long, allow_hyphen_values = true)]
        coord: HexCoord,

        #[arg(long, value_enum, default_value_t = TargetKind::Random)]
        target: TargetKind,

        #[arg(long)]
        theme: Option<DungeonTheme>,

        #[arg(long)]
        dungeon_size: Option<DungeonSize>,

        #[arg(long)]
        settlement_size: Option<SettlementSize>,

        #[arg(long)]
        landmark: Option<LandmarkKind>,

        #[arg(long)]
        terrain: Option<Terrain>,

        /// Куда записать результат (по умолчанию поверх исходного файла)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Продвинуть календарь мира
    Advance {
        #[arg(short, long)]
        world: PathBuf,

        #[arg(short, long, default_value_t = 1)]
        days: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Сгенерировать одно подземелье и напечатать его в JSON
    Dungeon {
        #[arg(short, long, default_value = "hexbinder")]
        seed: String,

        #[arg(long, default_value = "cave")]
        theme: DungeonTheme,

        #[arg(long, default_value = "medium")]
        size: DungeonSize,

        #[arg(long, default_value = "hills")]
        terrain: Terrain,

        /// Напечатать схему сетки вместо JSON
        #[arg(long)]
        ascii: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetKind {
    Clear,
    Random,
    Dungeon,
    Settlement,
    Landmark,
    Terrain,
}

fn load_world(path: &Path) -> Result<WorldData, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn save_json(path: &Path, value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn build_target(
    kind: TargetKind,
    theme: Option<DungeonTheme>,
    dungeon_size: Option<DungeonSize>,
    settlement_size: Option<SettlementSize>,
    landmark: Option<LandmarkKind>,
    terrain: Option<Terrain>,
) -> Result<RegenTarget, Box<dyn std::error::Error>> {
    Ok(match kind {
        TargetKind::Clear => RegenTarget::Clear,
        TargetKind::Random => RegenTarget::Random,
        TargetKind::Dungeon => RegenTarget::Dungeon {
            theme: theme.ok_or("--theme is required for a dungeon")?,
            size: dungeon_size,
        },
        TargetKind::Settlement => RegenTarget::Settlement {
            size: settlement_size.unwrap_or(SettlementSize::Village),
        },
        TargetKind::Landmark => RegenTarget::Landmark { kind: landmark },
        TargetKind::Terrain => RegenTarget::Terrain {
            terrain: terrain.ok_or("--terrain is required for a terrain change")?,
        },
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Generate {
            config,
            seed,
            output,
        } => {
            let mut params = match config {
                Some(path) => GenerationParams::from_toml_file(&path.to_string_lossy())?,
                None => GenerationParams::default(),
            };
            if let Some(seed) = seed {
                params.seed = seed;
            }
            info!(seed = %params.seed, radius = params.map_radius, "генерация мира");
            let world = generate_world(&params, &BuiltinData)?;
            save_json(&output, &world)?;
            info!(path = %output.display(), "мир сохранён");
        }
        Command::Regenerate {
            world,
            coord,
            target,
            theme,
            dungeon_size,
            settlement_size,
            landmark,
            terrain,
            output,
        } => {
            let current = load_world(&world)?;
            let target = build_target(target, theme, dungeon_size, settlement_size, landmark, terrain)?;
            let regen = regenerate(&current, coord, target, &BuiltinData)?;
            if let Some((from, to)) = regen.terrain_change {
                info!(%coord, %from, %to, "местность гекса изменена");
            }
            let path = output.unwrap_or(world);
            save_json(&path, &regen.world)?;
            info!(path = %path.display(), location = ?regen.location_id, "мир сохранён");
        }
        Command::Advance {
            world,
            days,
            output,
        } => {
            let current = load_world(&world)?;
            let next = advance_days(&current, days);
            info!(
                day = next.state.day,
                season = ?next.state.season,
                weather = ?next.state.weather,
                "календарь продвинут"
            );
            let path = output.unwrap_or(world);
            save_json(&path, &next)?;
        }
        Command::Dungeon {
            seed,
            theme,
            size,
            terrain,
            ascii,
        } => {
            let hex = Hex::new(HexCoord::new(0, 0), terrain);
            let params = DungeonParams::new(theme, size);
            let dungeon = generate_dungeon(&seed, &params, &hex, &BuiltinData)?;
            if ascii {
                println!("{}", dungeon.occupancy().to_ascii());
            } else {
                println!("{}", serde_json::to_string_pretty(&dungeon)?);
            }
        }
    }
    Ok(())
}
