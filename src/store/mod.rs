//! # Coordinate persistence
//!
//! The host keeps one `(id, x, y)` row per catalog item. [`CoordinateStore`] is
//! that boundary; [`MemoryStore`] backs it with an ordered map.

use std::collections::{BTreeMap, HashMap};

use anyhow::bail;
use log::debug;

use crate::pca::Coordinate;
use crate::ItemId;

pub trait CoordinateStore {
    /// Inserts every coordinate, dropping any payload. Fails without writing
    /// anything if an id is already stored or repeated in `coords`.
    fn insert_coordinates<P>(&mut self, coords: &[Coordinate<P>]) -> anyhow::Result<()>;

    /// Stored coordinates in ascending id order.
    fn coordinates(&self) -> anyhow::Result<Vec<Coordinate>>;

    fn coordinate_map(&self) -> anyhow::Result<HashMap<ItemId, Coordinate>> {
        Ok(self
            .coordinates()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }

    /// Returns whether a row for `id` existed.
    fn remove(&mut self, id: ItemId) -> anyhow::Result<bool>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) -> anyhow::Result<()>;
}

/// Replaces the stored coordinates with the result of a new run.
pub fn replace_all<S, P>(store: &mut S, coords: &[Coordinate<P>]) -> anyhow::Result<()>
where
    S: CoordinateStore,
{
    store.clear()?;
    store.insert_coordinates(coords)?;
    debug!("Stored {} coordinates", coords.len());
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: BTreeMap<ItemId, (f64, f64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoordinateStore for MemoryStore {
    fn insert_coordinates<P>(&mut self, coords: &[Coordinate<P>]) -> anyhow::Result<()> {
        let mut incoming = BTreeMap::new();
        for c in coords {
            if self.rows.contains_key(&c.id) || incoming.insert(c.id, (c.x, c.y)).is_some() {
                bail!("Coordinate for item {} already stored", c.id);
            }
        }
        self.rows.append(&mut incoming);
        Ok(())
    }

    fn coordinates(&self) -> anyhow::Result<Vec<Coordinate>> {
        Ok(self
            .rows
            .iter()
            .map(|(&id, &(x, y))| Coordinate::new(id, x, y))
            .collect())
    }

    fn remove(&mut self, id: ItemId) -> anyhow::Result<bool> {
        Ok(self.rows.remove(&id).is_some())
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.rows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pca::Analyzer;

    #[test]
    fn test_insert_and_read_back() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        let coords: Vec<Coordinate> = vec![
            Coordinate::new(5, 0.1, 0.9),
            Coordinate::new(2, 1.0, 0.0),
        ];
        store.insert_coordinates(&coords).unwrap();
        assert_eq!(store.len(), 2);

        let stored = store.coordinates().unwrap();
        assert_eq!(stored[0], Coordinate::new(2, 1.0, 0.0));
        assert_eq!(stored[1], Coordinate::new(5, 0.1, 0.9));

        let map = store.coordinate_map().unwrap();
        assert_eq!(map[&5].x, 0.1);

        assert!(store.remove(5).unwrap());
        assert!(!store.remove(5).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_writes_nothing() {
        let mut store = MemoryStore::new();
        store
            .insert_coordinates(&[Coordinate::<()>::new(1, 0.0, 0.0)])
            .unwrap();

        let batch = [
            Coordinate::<()>::new(2, 0.5, 0.5),
            Coordinate::<()>::new(1, 1.0, 1.0),
        ];
        assert!(store.insert_coordinates(&batch).is_err());
        assert_eq!(store.len(), 1);

        let repeated = [
            Coordinate::<()>::new(3, 0.5, 0.5),
            Coordinate::<()>::new(3, 1.0, 1.0),
        ];
        assert!(store.insert_coordinates(&repeated).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_payload_is_dropped() {
        let mut store = MemoryStore::new();
        let tagged = [Coordinate::<()>::new(4, 0.25, 0.75).with_payload("Track 4")];
        store.insert_coordinates(&tagged).unwrap();
        assert_eq!(store.coordinates().unwrap()[0].payload, None);
    }

    #[test]
    fn test_replace_all_after_run() {
        let mut store = MemoryStore::new();
        store
            .insert_coordinates(&[Coordinate::<()>::new(99, 0.0, 0.0)])
            .unwrap();

        let mut analyzer = Analyzer::new();
        analyzer.add_entry(1, &[1.0, 2.0]).unwrap();
        analyzer.add_entry(2, &[2.0, 0.5]).unwrap();
        analyzer.add_entry(3, &[0.0, 1.0]).unwrap();
        analyzer.perform_pca().unwrap();

        replace_all(&mut store, analyzer.coordinates().unwrap()).unwrap();
        let stored = store.coordinates().unwrap();
        assert_eq!(stored.as_slice(), analyzer.coordinates().unwrap());
    }
}
