// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет параметры, управляющие процедурной генерацией кампании:
//! - Сид и название мира
//! - Размер гексовой карты
//! - Количество поселений, подземелий, ориентиров и фракций
//! - Настройки рельефа (шум высот и влажности)
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Параметры рельефа
///
/// Высота и влажность берутся из двух независимых полей шума; пороги
/// определяют, в какой тип местности попадает гекс.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSettings {
    /// Частота шума высот (меньше = крупнее формы рельефа)
    #[serde(default = "default_elevation_frequency")]
    pub elevation_frequency: f32,

    /// Частота шума влажности
    #[serde(default = "default_moisture_frequency")]
    pub moisture_frequency: f32,

    /// Ниже этой высоты — вода (значения в диапазоне 0.0..1.0)
    #[serde(default = "default_water_level")]
    pub water_level: f32,

    /// Выше этой высоты — холмы
    #[serde(default = "default_hills_level")]
    pub hills_level: f32,

    /// Выше этой высоты — горы
    #[serde(default = "default_mountain_level")]
    pub mountain_level: f32,

    /// Влажность, при которой равнина становится лесом
    #[serde(default = "default_forest_moisture")]
    pub forest_moisture: f32,

    /// Влажность, при которой низина становится болотом
    #[serde(default = "default_swamp_moisture")]
    pub swamp_moisture: f32,
}

fn default_elevation_frequency() -> f32 {
    0.12
}
fn default_moisture_frequency() -> f32 {
    0.18
}
fn default_water_level() -> f32 {
    0.28
}
fn default_hills_level() -> f32 {
    0.66
}
fn default_mountain_level() -> f32 {
    0.8
}
fn default_forest_moisture() -> f32 {
    0.55
}
fn default_swamp_moisture() -> f32 {
    0.75
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            elevation_frequency: default_elevation_frequency(),
            moisture_frequency: default_moisture_frequency(),
            water_level: default_water_level(),
            hills_level: default_hills_level(),
            mountain_level: default_mountain_level(),
            forest_moisture: default_forest_moisture(),
            swamp_moisture: default_swamp_moisture(),
        }
    }
}

/// Параметры генерации мира
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Сид: любая строка. Один сид = один и тот же мир.
    #[serde(default = "default_seed")]
    pub seed: String,

    #[serde(default = "default_name")]
    pub name: String,

    /// Радиус шестиугольной карты в гексах
    #[serde(default = "default_map_radius")]
    pub map_radius: i32,

    #[serde(default = "default_settlements")]
    pub settlements: usize,

    #[serde(default = "default_dungeons")]
    pub dungeons: usize,

    #[serde(default = "default_landmarks")]
    pub landmarks: usize,

    #[serde(default = "default_factions")]
    pub factions: usize,

    /// Последний день кампании. После него календарь не продвигается.
    #[serde(default)]
    pub end_day: Option<u32>,

    #[serde(default)]
    pub terrain: TerrainSettings,
}

impl GenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = "misty-vale"
    /// map_radius = 10
    /// settlements = 8
    ///
    /// [terrain]
    /// water_level = 0.3
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&contents)?;
        Ok(params)
    }
}

fn default_seed() -> String {
    "hexbinder".to_string()
}
fn default_name() -> String {
    "The Unmapped Marches".to_string()
}
fn default_map_radius() -> i32 {
    8
}
fn default_settlements() -> usize {
    6
}
fn default_dungeons() -> usize {
    8
}
fn default_landmarks() -> usize {
    6
}
fn default_factions() -> usize {
    3
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            name: default_name(),
            map_radius: default_map_radius(),
            settlements: default_settlements(),
            dungeons: default_dungeons(),
            landmarks: default_landmarks(),
            factions: default_factions(),
            end_day: None,
            terrain: TerrainSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let params: GenerationParams = toml::from_str(
            r#"
            seed = "abc"
            dungeons = 2

            [terrain]
            water_level = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(params.seed, "abc");
        assert_eq!(params.dungeons, 2);
        assert_eq!(params.map_radius, default_map_radius());
        assert!((params.terrain.water_level - 0.1).abs() < f32::EPSILON);
        assert!((params.terrain.hills_level - default_hills_level()).abs() < f32::EPSILON);
        assert!(params.end_day.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GenerationParams::from_toml_file("/nonexistent/hexbinder.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
