//! Point index over rider origins.
//!
//! An implicit k-d tree: entries live in one `Vec`, and every subslice
//! `[lo, hi)` is a node whose median element at `lo + (hi - lo) / 2` splits the
//! remainder on latitude (even depth) or longitude (odd depth). Construction is
//! a recursive `select_nth_unstable`, so the tree is balanced by construction
//! and never rebalanced afterwards.
//!
//! Removal is tombstoning: removed entries stay in place and are skipped by
//! queries. A batch never re-inserts, so the tree shape is fixed for its life.

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::distance::calculate_bounding_box;
use crate::models::{BoundingBox, Coordinate};

#[derive(Debug, Clone)]
struct Entry<K> {
    key: K,
    point: Coordinate,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Lat,
    Lon,
}

impl Axis {
    #[inline]
    fn at_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::Lat
        } else {
            Axis::Lon
        }
    }

    #[inline]
    fn value(self, point: Coordinate) -> f64 {
        match self {
            Axis::Lat => point.lat,
            Axis::Lon => point.lon,
        }
    }

    #[inline]
    fn range(self, bbox: &BoundingBox) -> (f64, f64) {
        match self {
            Axis::Lat => (bbox.min_lat, bbox.max_lat),
            Axis::Lon => (bbox.min_lon, bbox.max_lon),
        }
    }
}

/// k-d tree over `(key, coordinate)` pairs with lazy removal
#[derive(Debug, Clone)]
pub struct SpatialIndex<K> {
    entries: Vec<Entry<K>>,
    alive: Vec<bool>,
    slots: HashMap<K, Vec<usize>>,
    live: usize,
}

impl<K> SpatialIndex<K>
where
    K: Clone + Eq + Hash,
{
    /// Build the index in O(P log P)
    ///
    /// Duplicate coordinates are fine. A key given more than once is indexed
    /// once per occurrence and removing it removes every occurrence.
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (K, Coordinate)>,
    {
        let mut entries: Vec<Entry<K>> = points
            .into_iter()
            .map(|(key, point)| Entry { key, point })
            .collect();

        build_subtree(&mut entries, 0);

        let mut slots: HashMap<K, Vec<usize>> = HashMap::with_capacity(entries.len());
        for (slot, entry) in entries.iter().enumerate() {
            slots.entry(entry.key.clone()).or_default().push(slot);
        }

        let live = entries.len();
        Self {
            alive: vec![true; live],
            entries,
            slots,
            live,
        }
    }

    /// Keys of live entries whose point lies in the bounding box of the
    /// circle `(center, radius_km)`
    ///
    /// This is a superset of the points within `radius_km`; callers re-check
    /// the exact distance.
    pub fn query(&self, center: Coordinate, radius_km: f64) -> Vec<K> {
        let bbox = calculate_bounding_box(center, radius_km);
        self.query_box(&bbox)
    }

    /// Keys of live entries inside `bbox`
    pub fn query_box(&self, bbox: &BoundingBox) -> Vec<K> {
        let mut found = Vec::new();
        if self.live > 0 {
            self.search(0, self.entries.len(), 0, bbox, &mut found);
        }
        found
    }

    /// Tombstone every entry stored under each key
    ///
    /// Unknown or already removed keys are ignored.
    pub fn remove<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        for key in keys {
            if let Some(slots) = self.slots.get(key) {
                for &slot in slots {
                    if self.alive[slot] {
                        self.alive[slot] = false;
                        self.live -= 1;
                    }
                }
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots
            .get(key)
            .map_or(false, |slots| slots.iter().any(|&slot| self.alive[slot]))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn search(&self, lo: usize, hi: usize, depth: usize, bbox: &BoundingBox, found: &mut Vec<K>) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let entry = &self.entries[mid];
        if self.alive[mid] && bbox.contains(entry.point) {
            found.push(entry.key.clone());
        }

        let axis = Axis::at_depth(depth);
        let split = axis.value(entry.point);
        let (min, max) = axis.range(bbox);

        // Left holds values <= split, right holds values >= split
        if min <= split {
            self.search(lo, mid, depth + 1, bbox, found);
        }
        if max >= split {
            self.search(mid + 1, hi, depth + 1, bbox, found);
        }
    }
}

fn build_subtree<K>(entries: &mut [Entry<K>], depth: usize) {
    if entries.len() <= 1 {
        return;
    }

    let mid = entries.len() / 2;
    let axis = Axis::at_depth(depth);
    entries.select_nth_unstable_by(mid, |a, b| {
        axis.value(a.point).total_cmp(&axis.value(b.point))
    });

    let (left, rest) = entries.split_at_mut(mid);
    build_subtree(left, depth + 1);
    build_subtree(&mut rest[1..], depth + 1);
}
