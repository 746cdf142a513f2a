use std::collections::{BTreeSet, HashMap};

use lurk_geom::{signed_angle_diff, ParentId, Polygon, Segment, Vec2};
use lurk_index::{SpatialIndex, SpatialIndexConfig};

use crate::{CastRequest, CastResult};

/// Angular offset of the side rays cast next to every candidate point.
const RAY_EPSILON: f64 = 1e-12;

/// Consecutive hit points closer than this are merged.
const MERGE_DISTANCE: f64 = 1e-7;

/// Obstacle endpoint shared by one or more segments.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyPoint {
    pub point: Vec2,
    /// Indices into [`Caster::segments`].
    pub segments: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Ranked {
    segment: Segment,
    min_dist: f64,
    max_dist: f64,
}

/// A ray to cast. `through` is the candidate point a center ray aims at exactly.
#[derive(Debug, Clone, Copy)]
struct Ray {
    angle: f64,
    through: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    key: f64,
    point: Vec2,
    parent: Option<ParentId>,
}

/// Reusable scratch buffers for [`Caster::cast_into`].
#[derive(Debug, Default)]
pub struct CastQuery {
    ranked: Vec<Ranked>,
    candidates: Vec<Vec2>,
    rays: Vec<Ray>,
    hits: Vec<Hit>,
}

impl CastQuery {
    fn clear(&mut self) {
        self.ranked.clear();
        self.candidates.clear();
        self.rays.clear();
        self.hits.clear();
    }
}

/// Angular ray sweep over obstacle boundaries.
///
/// Topology is rebuilt wholesale whenever obstacles change; casts only read it. The viewport's own
/// boundary takes part in each cast as ordinary geometry so rays always terminate.
#[derive(Debug, Clone)]
pub struct Caster {
    obstacles: Vec<Polygon>,
    segments: Vec<Segment>,
    points: Vec<TopologyPoint>,
    index: SpatialIndex,
}

impl Default for Caster {
    fn default() -> Self {
        Self::new()
    }
}

impl Caster {
    pub fn new() -> Self {
        Self::with_index_config(SpatialIndexConfig::default())
    }

    pub fn with_index_config(config: SpatialIndexConfig) -> Self {
        Self {
            obstacles: Vec::new(),
            segments: Vec::new(),
            points: Vec::new(),
            index: SpatialIndex::new(config),
        }
    }

    /// Rescan obstacle boundaries. Coincident endpoints of different segments become one point.
    pub fn rebuild_topology(&mut self, obstacles: &[Polygon]) {
        self.obstacles = obstacles.to_vec();
        self.segments.clear();
        self.points.clear();

        let mut by_position: HashMap<(u64, u64), usize> = HashMap::new();
        for (poly_idx, poly) in obstacles.iter().enumerate() {
            for segment in poly.segments_with_parent(ParentId(poly_idx as u32)) {
                let seg_idx = self.segments.len();
                self.segments.push(segment);
                for p in [segment.a, segment.b] {
                    let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
                    match by_position.get(&key) {
                        Some(&i) => self.points[i].segments.push(seg_idx),
                        None => {
                            by_position.insert(key, self.points.len());
                            self.points.push(TopologyPoint {
                                point: p,
                                segments: vec![seg_idx],
                            });
                        }
                    }
                }
            }
        }

        self.index.rebuild(self.segments.iter().copied());
        tracing::debug!(
            obstacles = obstacles.len(),
            segments = self.segments.len(),
            points = self.points.len(),
            "Caster topology rebuilt"
        );
    }

    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn points(&self) -> &[TopologyPoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn cast(&self, request: &CastRequest) -> CastResult {
        let mut query = CastQuery::default();
        self.cast_into(request, &mut query)
    }

    /// Same as [`Caster::cast`], reusing `query`'s buffers.
    pub fn cast_into(&self, request: &CastRequest, query: &mut CastQuery) -> CastResult {
        query.clear();
        let viewpoint = request.viewpoint;
        let viewport = &request.viewport;
        let bounds = viewport.bounds();

        // Obstacle segments that can reach into the viewport.
        let radius = bounds.width().hypot(bounds.height()) * 0.5 + self.index.config().sample_step;
        let nearby = self.index.get_nearby(bounds.center(), radius);
        let viewport_segments = viewport.segments();

        for (_, segment) in &nearby {
            for edge in &viewport_segments {
                if let Some(p) = edge.intersection(segment) {
                    query.candidates.push(p);
                }
            }
            query.ranked.push(rank(*segment, viewpoint));
        }
        for edge in &viewport_segments {
            query.ranked.push(rank(*edge, viewpoint));
        }
        query
            .ranked
            .sort_by(|a, b| a.min_dist.total_cmp(&b.min_dist));

        query.candidates.extend(viewport.points().iter().copied());
        query.candidates.extend(
            self.points
                .iter()
                .map(|tp| tp.point)
                .filter(|p| bounds.contains(*p) && viewport.contains(*p)),
        );

        let cone = request.is_cone();
        let half_fov = request.fov * 0.5;
        for p in &query.candidates {
            let angle = (*p - viewpoint).angle();
            if !cone || signed_angle_diff(angle, request.look_angle).abs() < half_fov {
                query.rays.extend([
                    Ray::new(angle - RAY_EPSILON),
                    Ray {
                        angle,
                        through: Some(*p),
                    },
                    Ray::new(angle + RAY_EPSILON),
                ]);
            }
        }
        if cone {
            query.rays.push(Ray::new(request.look_angle - half_fov));
            query.rays.push(Ray::new(request.look_angle + half_fov));
        }

        for ray in &query.rays {
            if let Some((point, parent)) = cast_ray(viewpoint, *ray, &query.ranked) {
                query.hits.push(Hit {
                    key: signed_angle_diff(ray.angle, request.look_angle),
                    point,
                    parent,
                });
            }
        }
        query.hits.sort_by(|a, b| a.key.total_cmp(&b.key));

        let mut points: Vec<Vec2> = Vec::with_capacity(query.hits.len() + 1);
        for hit in &query.hits {
            if points
                .last()
                .is_some_and(|last| last.distance(hit.point) <= MERGE_DISTANCE)
            {
                continue;
            }
            points.push(hit.point);
        }
        if !cone {
            while points.len() > 1
                && points[0].distance(points[points.len() - 1]) <= MERGE_DISTANCE
            {
                points.pop();
            }
        } else {
            points.push(viewpoint);
        }

        let mut result = CastResult {
            visible: (points.len() >= 3).then(|| Polygon::new(points)),
            ..CastResult::default()
        };
        if request.include_structure {
            let ids: BTreeSet<ParentId> = query.hits.iter().filter_map(|h| h.parent).collect();
            for id in ids {
                if let Some(poly) = self.obstacles.get(id.0 as usize) {
                    result.structures.push(poly.clone());
                    result.structure_ids.push(id);
                }
            }
        }

        tracing::trace!(
            segments = query.ranked.len(),
            rays = query.rays.len(),
            hits = query.hits.len(),
            "Cast complete"
        );
        result
    }
}

fn rank(segment: Segment, viewpoint: Vec2) -> Ranked {
    Ranked {
        segment,
        min_dist: segment.distance_to(viewpoint),
        max_dist: segment.a.distance(viewpoint).max(segment.b.distance(viewpoint)),
    }
}

impl Ray {
    fn new(angle: f64) -> Self {
        Self {
            angle,
            through: None,
        }
    }

    /// Where this ray meets `segment`. A center ray meets every segment ending at its candidate,
    /// which rounding in the direction vector could otherwise slip between.
    fn hit(&self, origin: Vec2, dir: Vec2, segment: &Segment) -> Option<(f64, Vec2)> {
        match self.through {
            Some(p) if segment.a == p || segment.b == p => Some((p.distance(origin), p)),
            _ => segment
                .ray_intersection(origin, dir)
                .map(|hit| (hit.distance, hit.point)),
        }
    }
}

/// Nearest hit along the ray, scanning segments by increasing distance.
///
/// Once a hit exists, scanning stops at the first segment whose nearest point is at least as far as
/// the hit segment's farthest endpoint.
fn cast_ray(origin: Vec2, ray: Ray, ranked: &[Ranked]) -> Option<(Vec2, Option<ParentId>)> {
    let dir = match ray.through {
        Some(p) if p != origin => (p - origin).unit(),
        _ => Vec2::from_angle(ray.angle, 1.0),
    };
    let mut best: Option<(f64, Vec2, Option<ParentId>)> = None;
    let mut search_limit = 0.0;
    for r in ranked {
        if let Some((distance, point)) = ray.hit(origin, dir, &r.segment) {
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, point, r.segment.parent));
                search_limit = r.max_dist;
            }
        }
        if best.is_some() && r.min_dist >= search_limit {
            break;
        }
    }
    best.map(|(_, point, parent)| (point, parent))
}
