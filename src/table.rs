//! Плоские таблицы сущностей, индексированные по ключу
//!
//! Мир хранит все сущности в отдельных таблицах со ссылками по id, а не в
//! графе вложенного владения. Это позволяет заменить одну сущность без обхода
//! владельцев. В JSON таблица сериализуется как массив строк в порядке ключей.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Сущность с уникальным ключом
pub trait Keyed {
    type Key: Ord + Clone + std::fmt::Debug;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Vec<T>",
    into = "Vec<T>",
    bound(serialize = "T: Serialize + Clone", deserialize = "T: Deserialize<'de>")
)]
pub struct Table<T: Keyed> {
    rows: BTreeMap<T::Key, T>,
}

impl<T: Keyed> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Keyed> Table<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Вставляет строку, возвращая вытесненную (если ключ уже был)
    pub fn insert(&mut self, row: T) -> Option<T> {
        self.rows.insert(row.key(), row)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.remove(key)
    }

    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.get_mut(key)
    }

    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, T::Key, T> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, T::Key, T> {
        self.rows.values_mut()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, T::Key, T> {
        self.rows.keys()
    }

    /// Удаляет все строки, для которых предикат ложен
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }
}

impl<T: Keyed> From<Vec<T>> for Table<T> {
    fn from(rows: Vec<T>) -> Self {
        rows.into_iter().collect()
    }
}

impl<T: Keyed> From<Table<T>> for Vec<T> {
    fn from(table: Table<T>) -> Self {
        table.rows.into_values().collect()
    }
}

impl<T: Keyed> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T: Keyed> Extend<T> for Table<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for row in iter {
            self.insert(row);
        }
    }
}

impl<'a, T: Keyed> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, T::Key, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        value: u32,
    }

    impl Keyed for Row {
        type Key = String;

        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn row(id: &str, value: u32) -> Row {
        Row {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn insert_replaces_by_key() {
        let mut table = Table::new();
        assert!(table.insert(row("a", 1)).is_none());
        assert_eq!(table.insert(row("a", 2)).map(|r| r.value), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&"a".to_string()).map(|r| r.value), Some(2));
    }

    #[test]
    fn serializes_as_sorted_array() {
        let table: Table<Row> = vec![row("b", 2), row("a", 1)].into();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"id":"a","value":1},{"id":"b","value":2}]"#);
        let back: Table<Row> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
