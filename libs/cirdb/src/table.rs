//! Append-only entity tables.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use arcstr::ArcStr;

use crate::error::{Error, Result};
use crate::id::Id;

/// A dense, append-only collection of entities addressed by [`Id`].
///
/// Entities may optionally be registered under a unique name.
/// Ids are assigned in insertion order and never change.
#[derive(Debug, Clone)]
pub struct Table<T> {
    kind: &'static str,
    items: Vec<T>,
    name_map: HashMap<ArcStr, Id<T>>,
}

impl<T> Table<T> {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            name_map: HashMap::new(),
        }
    }

    /// Appends an unnamed entity.
    pub(crate) fn push(&mut self, item: T) -> Id<T> {
        let id = Id::new(self.items.len());
        self.items.push(item);
        id
    }

    /// Appends an entity under a unique name.
    ///
    /// Fails without modifying the table if the name is taken.
    pub(crate) fn push_named(&mut self, name: ArcStr, item: T) -> Result<Id<T>> {
        if self.name_map.contains_key(&name) {
            return Err(Error::DuplicateName {
                kind: self.kind,
                name,
            });
        }
        let id = self.push(item);
        self.name_map.insert(name, id);
        Ok(id)
    }

    /// The number of entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the table holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Gets the entity with the given id, or [`None`] if the id is
    /// not from this table.
    #[inline]
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Gets the entity with the given id, failing if the id is not from this table.
    pub fn try_get(&self, id: Id<T>) -> Result<&T> {
        let len = self.items.len();
        self.items.get(id.index()).ok_or(Error::IdOutOfRange {
            kind: self.kind,
            index: id.index(),
            len,
        })
    }

    pub(crate) fn try_get_mut(&mut self, id: Id<T>) -> Result<&mut T> {
        let len = self.items.len();
        let kind = self.kind;
        self.items.get_mut(id.index()).ok_or(Error::IdOutOfRange {
            kind,
            index: id.index(),
            len,
        })
    }

    /// Looks up the id registered under `name`.
    #[inline]
    pub fn id_named(&self, name: &str) -> Option<Id<T>> {
        self.name_map.get(name).copied()
    }

    /// Looks up the id registered under `name`, failing if there is none.
    pub fn try_id_named(&self, name: &str) -> Result<Id<T>> {
        self.id_named(name).ok_or_else(|| Error::NotFound {
            kind: self.kind,
            name: ArcStr::from(name),
        })
    }

    /// Returns `true` if an entity is registered under `name`.
    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    /// Iterates over all ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = Id<T>> + '_ {
        (0..self.items.len()).map(Id::new)
    }

    /// Iterates over `(id, entity)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Id::new(i), item))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Id<T>, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (Id::new(i), item))
    }
}

impl<T> Index<Id<T>> for Table<T> {
    type Output = T;

    fn index(&self, index: Id<T>) -> &Self::Output {
        &self.items[index.index()]
    }
}

impl<T> IndexMut<Id<T>> for Table<T> {
    fn index_mut(&mut self, index: Id<T>) -> &mut Self::Output {
        &mut self.items[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entries_are_unique() {
        let mut table = Table::<u32>::new("thing");
        let a = table.push_named("a".into(), 1).unwrap();
        let b = table.push(2);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(
            table.push_named("a".into(), 3),
            Err(Error::DuplicateName {
                kind: "thing",
                name: "a".into()
            })
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.id_named("a"), Some(a));
        assert_eq!(table[b], 2);
        assert!(matches!(
            table.try_id_named("c"),
            Err(Error::NotFound { kind: "thing", .. })
        ));
    }
}
