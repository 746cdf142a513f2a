use crate::SegmentId;

const DEFAULT_CAPACITY: usize = 337;
const MAX_DENSITY: f64 = 0.5;
const GROWTH: usize = 3;

/// Open-addressing dedup set keyed by a segment's stable hash.
///
/// Two different segments may share a hash, so a probe that meets an equal hash with a different
/// [`SegmentId`] keeps going; membership is decided by the id, never by the hash alone.
#[derive(Debug, Clone)]
pub struct SegmentSet {
    slots: Vec<Option<(u64, SegmentId)>>,
    len: usize,
}

impl Default for SegmentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the entry was not present before.
    pub fn insert(&mut self, hash: u64, id: SegmentId) -> bool {
        self.grow_if_dense();
        let mut pos = self.home(hash);
        loop {
            match self.slots[pos] {
                None => {
                    self.slots[pos] = Some((hash, id));
                    self.len += 1;
                    return true;
                }
                Some((h, existing)) if h == hash && existing == id => return false,
                Some(_) => pos = (pos + 1) % self.slots.len(),
            }
        }
    }

    pub fn contains(&self, hash: u64, id: SegmentId) -> bool {
        let mut pos = self.home(hash);
        for _ in 0..self.slots.len() {
            match self.slots[pos] {
                None => return false,
                Some((h, existing)) if h == hash && existing == id => return true,
                Some(_) => pos = (pos + 1) % self.slots.len(),
            }
        }
        false
    }

    /// Empty the set, keeping its current capacity.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    fn grow_if_dense(&mut self) {
        let density = self.len as f64 / self.slots.len() as f64;
        if density <= MAX_DENSITY {
            return;
        }
        let grown = vec![None; self.slots.len() * GROWTH];
        let old = std::mem::replace(&mut self.slots, grown);
        self.len = 0;
        for (hash, id) in old.into_iter().flatten() {
            let mut pos = self.home(hash);
            while self.slots[pos].is_some() {
                pos = (pos + 1) % self.slots.len();
            }
            self.slots[pos] = Some((hash, id));
            self.len += 1;
        }
    }
}
