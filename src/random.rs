//! Детерминированный генератор случайных чисел с иерархией сидов
//!
//! Алгоритм зафиксирован и не зависит от платформы:
//! - строковый сид хэшируется 64-битным FNV-1a;
//! - хэш инициализирует `ChaCha8Rng` через `seed_from_u64`.
//!
//! Производные сиды строятся конкатенацией строк
//! (`base:purpose:discriminator`), а не продолжением общего потока.
//! Поэтому перегенерация одной сущности не сдвигает последовательность другой.

use crate::error::{GenError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Алфавит для идентификаторов сущностей
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 8;

/// 64-битный FNV-1a. `DefaultHasher` не подходит: его вывод не стабилен между версиями Rust.
#[must_use]
pub fn hash_seed(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Строит производный сид: `base:purpose:discriminator`
#[must_use]
pub fn derive_seed(base: &str, purpose: &str, discriminator: impl std::fmt::Display) -> String {
    format!("{base}:{purpose}:{discriminator}")
}

/// Сидированный ГСЧ. Состояние локально, глобального ГСЧ нет.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: String,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let rng = ChaCha8Rng::seed_from_u64(hash_seed(&seed));
        Self { seed, rng }
    }

    /// Исходный строковый сид
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Независимый поток для подзадачи. Не потребляет состояние `self`.
    #[must_use]
    pub fn derive(&self, purpose: &str, discriminator: impl std::fmt::Display) -> Self {
        Self::new(derive_seed(&self.seed, purpose, discriminator))
    }

    /// Равномерное значение в [0, 1)
    pub fn next(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Целое в [min, max] включительно
    pub fn between(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    /// Вещественное в [min, max)
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next() < probability
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T> {
        items
            .choose(&mut self.rng)
            .ok_or(GenError::EmptyInput("pick from empty list"))
    }

    /// Взвешенный выбор: вероятность пропорциональна весу.
    /// Отрицательные веса считаются нулевыми.
    pub fn pick_weighted<'a, T, W>(&mut self, entries: &'a [(T, W)]) -> Result<&'a T>
    where
        W: Copy + Into<f64>,
    {
        let weights = entries.iter().map(|(_, w)| (*w).into().max(0.0));
        let dist = WeightedIndex::new(weights)
            .map_err(|_| GenError::EmptyInput("weighted pick with zero total weight"))?;
        Ok(&entries[dist.sample(&mut self.rng)].0)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// До `n` различных элементов без повторов
    pub fn sample<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        items.choose_multiple(&mut self.rng, n).cloned().collect()
    }

    /// Идентификатор сущности, выведенный из потока: `prefix-xxxxxxxx`
    pub fn id(&mut self, prefix: &str) -> String {
        let suffix: String = (0..ID_LEN)
            .map(|_| char::from(ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())]))
            .collect();
        format!("{prefix}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRandom::new("abc");
        let mut b = SeededRandom::new("abc");
        for _ in 0..32 {
            assert_eq!(a.next().to_bits(), b.next().to_bits());
        }
    }

    #[test]
    fn derive_does_not_touch_parent_stream() {
        let mut a = SeededRandom::new("world");
        let mut b = SeededRandom::new("world");
        let _child = a.derive("dungeon", "0,1");
        assert_eq!(a.between(0, 1000), b.between(0, 1000));
        assert_eq!(a.derive("x", 1).seed(), "world:x:1");
    }

    #[test]
    fn between_is_inclusive() {
        let mut rng = SeededRandom::new("bounds");
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..500 {
            let v = rng.between(1, 3);
            assert!((1..=3).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn empty_inputs_are_errors() {
        let mut rng = SeededRandom::new("empty");
        let empty: [u8; 0] = [];
        assert!(matches!(rng.pick(&empty), Err(GenError::EmptyInput(_))));
        let zero = [("a", 0u32), ("b", 0u32)];
        assert!(matches!(rng.pick_weighted(&zero), Err(GenError::EmptyInput(_))));
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = SeededRandom::new("weights");
        let table = [("never", 0u32), ("always", 5u32)];
        for _ in 0..100 {
            assert_eq!(*rng.pick_weighted(&table).unwrap(), "always");
        }
    }

    #[test]
    fn negative_weights_count_as_zero() {
        let mut rng = SeededRandom::new("negative");
        let table = [("never", -3.0_f64), ("always", 1.0)];
        for _ in 0..50 {
            assert_eq!(*rng.pick_weighted(&table).unwrap(), "always");
        }
    }

    #[test]
    fn sample_has_no_repeats() {
        let mut rng = SeededRandom::new("sample");
        let items: Vec<u32> = (0..10).collect();
        let mut picked = rng.sample(&items, 4);
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert_eq!(rng.sample(&items, 20).len(), 10);
    }

    #[test]
    fn shuffle_is_seeded_permutation() {
        let mut a: Vec<u32> = (0..16).collect();
        let mut b = a.clone();
        SeededRandom::new("shuffle").shuffle(&mut a);
        SeededRandom::new("shuffle").shuffle(&mut b);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn ids_are_seed_derived() {
        let a = SeededRandom::new("ids").id("room");
        let b = SeededRandom::new("ids").id("room");
        assert_eq!(a, b);
        assert!(a.starts_with("room-"));
        assert_eq!(a.len(), "room-".len() + ID_LEN);
    }

    #[test]
    fn fnv_hash_is_stable() {
        // Эталон FNV-1a для пустой строки и "a"
        assert_eq!(hash_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(hash_seed("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
