use std::collections::{BTreeSet, HashMap};

use lurk_geom::{Segment, Vec2};

use crate::SegmentSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HASH_X: i64 = 73_856_093;
const HASH_Y: i64 = 19_349_663;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpatialIndexConfig {
    /// Side length of a square cell in world units.
    pub cell_size: f64,
    /// Distance between the samples taken along a segment when registering it.
    pub sample_step: f64,
}

impl Default for SpatialIndexConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            sample_step: 1.0,
        }
    }
}

/// Handle of a segment stored in a [`SpatialIndex`]. Ids of removed segments are reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentId(pub u32);

#[derive(Debug, Clone)]
struct Entry {
    segment: Segment,
    cells: Vec<i64>,
}

/// Map from cell hash to the set of segments touching that cell.
///
/// A segment is registered in every cell hit by samples taken every `sample_step` along it, plus
/// the cell of its end point, so a segment spanning many cells appears in all of them. Distinct
/// cells may collide on the same hash; buckets are sets, so queries may over-report but never miss.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    config: SpatialIndexConfig,
    entries: Vec<Option<Entry>>,
    free: Vec<u32>,
    buckets: HashMap<i64, BTreeSet<SegmentId>>,
    len: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(SpatialIndexConfig::default())
    }
}

impl SpatialIndex {
    pub fn new(config: SpatialIndexConfig) -> Self {
        debug_assert!(config.cell_size > 0.0, "cell_size must be positive");
        debug_assert!(config.sample_step > 0.0, "sample_step must be positive");
        Self {
            config,
            entries: Vec::new(),
            free: Vec::new(),
            buckets: HashMap::new(),
            len: 0,
        }
    }

    pub fn config(&self) -> &SpatialIndexConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.entries
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|e| &e.segment)
    }

    /// Iterate every stored segment with its id.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (SegmentId(i as u32), &e.segment)))
    }

    pub fn add(&mut self, segment: Segment) -> SegmentId {
        debug_assert!(
            segment.a.is_finite() && segment.b.is_finite(),
            "indexed segment must have finite endpoints"
        );
        let cells = self.cells_for(&segment);
        let entry = Entry { segment, cells };

        let id = match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(entry);
                SegmentId(slot)
            }
            None => {
                self.entries.push(Some(entry));
                SegmentId((self.entries.len() - 1) as u32)
            }
        };

        if let Some(entry) = &self.entries[id.0 as usize] {
            for cell in &entry.cells {
                self.buckets.entry(*cell).or_default().insert(id);
            }
        }
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let entry = self.entries.get_mut(id.0 as usize)?.take()?;
        for cell in &entry.cells {
            if let Some(bucket) = self.buckets.get_mut(cell) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.buckets.remove(cell);
                }
            }
        }
        self.free.push(id.0);
        self.len -= 1;
        Some(entry.segment)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.buckets.clear();
        self.len = 0;
    }

    /// Replace the whole contents. Ids are assigned in iteration order starting at zero.
    pub fn rebuild<I>(&mut self, segments: I)
    where
        I: IntoIterator<Item = Segment>,
    {
        self.clear();
        for segment in segments {
            self.add(segment);
        }
        tracing::debug!(
            segments = self.len,
            cells = self.buckets.len(),
            "Spatial index rebuilt"
        );
    }

    pub fn cell_hash(&self, point: Vec2) -> i64 {
        let (ix, iy) = self.cell_coords(point);
        hash_cell(ix, iy)
    }

    /// Segments registered in the `(2 * ceil(radius / cell_size) + 1)^2` cells around `point`,
    /// each reported once.
    pub fn get_nearby(&self, point: Vec2, radius: f64) -> Vec<(SegmentId, Segment)> {
        let mut seen = SegmentSet::new();
        let mut out = Vec::new();
        let range = (radius.max(0.0) / self.config.cell_size).ceil() as i64;
        let (cx, cy) = self.cell_coords(point);
        for ix in cx - range..=cx + range {
            for iy in cy - range..=cy + range {
                self.collect_cell(hash_cell(ix, iy), &mut seen, &mut out);
            }
        }
        out
    }

    /// Segments in the cells swept by a three-sample-wide ray marched in `cell_size` steps.
    pub fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f64,
    ) -> Vec<(SegmentId, Segment)> {
        let mut seen = SegmentSet::new();
        let mut out = Vec::new();
        let dir = direction.unit();
        if dir.is_zero() {
            return out;
        }

        let step = self.config.cell_size;
        let side = dir.perpendicular() * (step * 0.33);
        let offsets = [dir * (step * 0.05), side, -side];
        let mut pos = origin;
        let mut travelled = 0.0;
        while travelled < max_distance {
            for offset in offsets {
                self.collect_cell(self.cell_hash(pos + offset), &mut seen, &mut out);
            }
            pos += dir * step;
            travelled += step;
        }
        out
    }

    /// Every segment that could cross the straight line `a -> b`.
    ///
    /// The radius is padded by one sample step: a segment is only registered where it was sampled,
    /// which may be a neighbouring cell of the crossing point.
    pub fn segments_near_line(&self, a: Vec2, b: Vec2) -> Vec<(SegmentId, Segment)> {
        self.get_nearby(
            a.lerp(b, 0.5),
            a.distance(b) * 0.5 + self.config.sample_step,
        )
    }

    fn collect_cell(&self, hash: i64, seen: &mut SegmentSet, out: &mut Vec<(SegmentId, Segment)>) {
        let Some(bucket) = self.buckets.get(&hash) else {
            return;
        };
        for &id in bucket {
            let Some(segment) = self.get(id) else {
                continue;
            };
            if seen.insert(segment.stable_hash(), id) {
                out.push((id, *segment));
            }
        }
    }

    fn cell_coords(&self, point: Vec2) -> (i64, i64) {
        let inv = 1.0 / self.config.cell_size;
        ((point.x * inv).floor() as i64, (point.y * inv).floor() as i64)
    }

    fn cells_for(&self, segment: &Segment) -> Vec<i64> {
        let mut cells = BTreeSet::new();
        let diff = segment.direction();
        let len = diff.length();
        let step = diff.unit() * self.config.sample_step;
        let mut pos = segment.a;
        let mut travelled = 0.0;
        while travelled < len {
            cells.insert(self.cell_hash(pos));
            pos += step;
            travelled += self.config.sample_step;
        }
        cells.insert(self.cell_hash(segment.b));
        cells.into_iter().collect()
    }
}

fn hash_cell(ix: i64, iy: i64) -> i64 {
    ix.wrapping_mul(HASH_X).wrapping_add(iy.wrapping_mul(HASH_Y))
}
