//! Ошибки генерации и проверки целостности мира

use thiserror::Error;

/// Ошибки генераторов и контроллера регенерации
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    /// Запрошенная комбинация темы/местности/размера структурно невозможна
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// Ограниченный поиск раскладки не смог выполнить ограничения
    #[error("generation exhausted: placed {placed} of {required} after {attempts} attempts")]
    GenerationExhausted {
        placed: usize,
        required: usize,
        attempts: usize,
    },

    /// Выбор из пустого набора (ошибка конфигурации данных)
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Ссылка по id не разрешается (нарушен инвариант мира)
    #[error("reference integrity violated: {0}")]
    ReferenceIntegrity(String),
}

impl GenError {
    pub fn invalid_placement(msg: impl Into<String>) -> Self {
        Self::InvalidPlacement(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::ReferenceIntegrity(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
