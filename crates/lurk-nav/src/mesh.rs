use core::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use lurk_geom::{clip, triangulate, Polygon, Segment, Vec2};
use lurk_index::{SpatialIndex, SpatialIndexConfig};

use crate::{Endpoint, Graph, NavError, NavPath, NavRaycastHit, NavRegionId, Navigator, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parameters for turning obstacle geometry into walkable triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavMeshConfig {
    /// Clearance kept between routes and obstacle walls.
    pub agent_radius: f64,
    /// Fixed-point scale used by polygon clipping.
    pub clip_scale: f64,
    /// Vertices closer than this to a neighbour are dropped from the inflated contours.
    pub clean_distance: f64,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            agent_radius: 3.5,
            clip_scale: clip::DEFAULT_SCALE,
            clean_distance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebuildStats {
    pub triangles: usize,
    pub holes: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct NavMesh {
    config: NavMeshConfig,
    tris: Vec<[Vec2; 3]>,
    centroids: Vec<Vec2>,
    graph: Graph<NavRegionId>,
    holes: Vec<Polygon>,
    boundary_edges: Vec<Segment>,
    boundary_index: SpatialIndex,
    last_path: RefCell<Option<NavPath>>,
}

impl Default for NavMesh {
    fn default() -> Self {
        Self::new(NavMeshConfig::default())
    }
}

impl NavMesh {
    /// Empty mesh; every query fails until [`NavMesh::rebuild`] succeeds.
    pub fn new(config: NavMeshConfig) -> Self {
        Self::from_triangles(config, Vec::new())
    }

    /// Build a navmesh from a set of non-overlapping triangles.
    ///
    /// Adjacency is inferred from shared edges; edges used by a single triangle form the boundary.
    pub fn from_triangles(config: NavMeshConfig, tris: Vec<[Vec2; 3]>) -> Self {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct VertexKey(u64, u64);

        impl VertexKey {
            fn from_vec2(p: Vec2) -> Self {
                Self((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
            }
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct EdgeKey(VertexKey, VertexKey);

        impl EdgeKey {
            fn new(a: Vec2, b: Vec2) -> Self {
                let ka = VertexKey::from_vec2(a);
                let kb = VertexKey::from_vec2(b);
                if ka <= kb {
                    Self(ka, kb)
                } else {
                    Self(kb, ka)
                }
            }
        }

        let mut graph = Graph::new();
        let mut shared = vec![[false; 3]; tris.len()];
        let mut edge_map: BTreeMap<EdgeKey, (usize, usize)> = BTreeMap::new();

        for (tri_idx, tri) in tris.iter().enumerate() {
            graph.add_node(NavRegionId(tri_idx as u32));
            for (edge_idx, (a, b)) in tri_edges(tri).into_iter().enumerate() {
                let key = EdgeKey::new(a, b);
                if let Some((other_tri, other_edge)) = edge_map.remove(&key) {
                    shared[tri_idx][edge_idx] = true;
                    shared[other_tri][other_edge] = true;
                    graph.add_edge(NavRegionId(other_tri as u32), NavRegionId(tri_idx as u32));
                } else {
                    edge_map.insert(key, (tri_idx, edge_idx));
                }
            }
        }

        let mut boundary_edges = Vec::new();
        for (tri_idx, tri) in tris.iter().enumerate() {
            for (edge_idx, (a, b)) in tri_edges(tri).into_iter().enumerate() {
                if !shared[tri_idx][edge_idx] {
                    boundary_edges.push(Segment::new(a, b));
                }
            }
        }

        let mut boundary_index = SpatialIndex::new(SpatialIndexConfig::default());
        boundary_index.rebuild(boundary_edges.iter().copied());

        let centroids = tris.iter().map(|t| tri_centroid(*t)).collect();

        Self {
            config,
            tris,
            centroids,
            graph,
            holes: Vec::new(),
            boundary_edges,
            boundary_index,
            last_path: RefCell::new(None),
        }
    }

    /// Recompute the walkable area from obstacle polygons inside `bounds`.
    ///
    /// Obstacles are unioned, inflated by the agent radius, cleaned, subtracted from `bounds` and
    /// triangulated. On failure the previous mesh is kept and the error is returned.
    pub fn rebuild(&mut self, obstacles: &[Polygon], bounds: &Polygon) -> Result<RebuildStats> {
        let started = Instant::now();
        match Self::bake(self.config, obstacles, bounds) {
            Ok(mesh) => {
                *self = mesh;
                let stats = RebuildStats {
                    triangles: self.tris.len(),
                    holes: self.holes.len(),
                    elapsed: started.elapsed(),
                };
                tracing::info!(
                    triangles = stats.triangles,
                    holes = stats.holes,
                    elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
                    "NavMesh rebuilt"
                );
                Ok(stats)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    obstacles = obstacles.len(),
                    "NavMesh rebuild failed, keeping previous mesh"
                );
                Err(err)
            }
        }
    }

    fn bake(config: NavMeshConfig, obstacles: &[Polygon], bounds: &Polygon) -> Result<Self> {
        let scale = config.clip_scale;
        let merged = clip::union(obstacles, scale)?;
        let inflated = if config.agent_radius > 0.0 {
            clip::offset(&merged, config.agent_radius, scale)?
        } else {
            merged
        };
        let holes = clip::simplify(&inflated, config.clean_distance);
        let walkable = clip::difference(core::slice::from_ref(bounds), &holes, scale)?;

        let tris = triangulate(&walkable)?
            .iter()
            .map(|t| {
                let p = t.points();
                [p[0], p[1], p[2]]
            })
            .collect();

        let mut mesh = Self::from_triangles(config, tris);
        mesh.holes = holes;
        Ok(mesh)
    }

    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn triangles(&self) -> &[[Vec2; 3]] {
        &self.tris
    }

    pub fn triangle(&self, id: NavRegionId) -> Option<Polygon> {
        self.tris
            .get(id.0 as usize)
            .map(|t| Polygon::triangle(t[0], t[1], t[2]))
    }

    pub fn centroids(&self) -> &[Vec2] {
        &self.centroids
    }

    pub fn centroid(&self, id: NavRegionId) -> Option<Vec2> {
        self.centroids.get(id.0 as usize).copied()
    }

    pub fn graph(&self) -> &Graph<NavRegionId> {
        &self.graph
    }

    /// Inflated obstacle contours cut out of the walkable area by the last successful rebuild.
    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    pub fn boundary_edges(&self) -> &[Segment] {
        &self.boundary_edges
    }

    /// Most recent successful path, kept for inspection.
    pub fn last_path(&self) -> Option<NavPath> {
        self.last_path.borrow().clone()
    }

    pub fn find_triangle(&self, p: Vec2) -> Option<NavRegionId> {
        self.tris
            .iter()
            .position(|tri| point_in_triangle(p, *tri))
            .map(|i| NavRegionId(i as u32))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.find_triangle(p).is_some()
    }

    pub fn nearest_centroid(&self, p: Vec2) -> Option<(NavRegionId, Vec2)> {
        self.centroids
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_squared(p).total_cmp(&b.distance_squared(p)))
            .map(|(i, c)| (NavRegionId(i as u32), *c))
    }

    pub fn centroids_within(&self, center: Vec2, range: f64) -> Vec<(NavRegionId, Vec2)> {
        let r2 = range * range;
        self.centroids
            .iter()
            .enumerate()
            .filter(|(_, c)| c.distance_squared(center) <= r2)
            .map(|(i, c)| (NavRegionId(i as u32), *c))
            .collect()
    }

    /// Closest point on the mesh surface; `p` itself when it is already covered.
    pub fn nearest_point(&self, p: Vec2) -> Option<Vec2> {
        let mut best: Option<(f64, Vec2)> = None;
        for tri in self.tris.iter() {
            let q = closest_point_on_triangle(p, *tri);
            let d2 = q.distance_squared(p);
            match best {
                None => best = Some((d2, q)),
                Some((best_d2, _)) if d2 < best_d2 => best = Some((d2, q)),
                _ => {}
            }
        }
        best.map(|(_, q)| q)
    }

    /// Return the first point where the segment from `start` to `end` exits the mesh.
    pub fn raycast(&self, start: Vec2, end: Vec2) -> Option<NavRaycastHit> {
        // If the start point isn't even on the mesh, treat that as "no raycast".
        self.find_triangle(start)?;
        let t = self.first_boundary_crossing(start, end)?;
        Some(NavRaycastHit {
            point: start.lerp(end, t),
        })
    }

    /// True when the straight line `a -> b` crosses no mesh boundary edge.
    pub fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        self.first_boundary_crossing(a, b).is_none()
    }

    /// Triangle corridor from the triangle containing `start` to the one containing `goal`.
    ///
    /// Edge cost and heuristic are both the distance between triangle centroids.
    pub fn find_global_path(&self, start: Vec2, goal: Vec2) -> Result<Vec<NavRegionId>> {
        let src = self.find_triangle(start).ok_or(NavError::PointNotContained {
            endpoint: Endpoint::Start,
            point: start,
        })?;
        let dst = self.find_triangle(goal).ok_or(NavError::PointNotContained {
            endpoint: Endpoint::Goal,
            point: goal,
        })?;

        let centroid = |id: NavRegionId| self.centroids[id.0 as usize];
        let goal_centroid = centroid(dst);
        self.graph
            .a_star(
                src,
                dst,
                |a, b| centroid(a).distance(centroid(b)),
                |n| centroid(n).distance(goal_centroid),
            )
            .ok_or(NavError::Unreachable {
                from: start,
                to: goal,
            })
    }

    /// Waypoint route from `start` to `goal`, straightened by line-of-sight shortcuts.
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> Result<NavPath> {
        let regions = self.find_global_path(start, goal)?;

        // Centroids joined through the midpoints of the shared edges, so every leg of the raw chain
        // stays inside one triangle.
        let mut points = Vec::with_capacity(regions.len() * 2 + 1);
        points.push(start);
        for (i, id) in regions.iter().enumerate() {
            if i > 0 {
                if let Some(mid) = self.portal_midpoint(regions[i - 1], *id) {
                    points.push(mid);
                }
            }
            points.push(self.centroids[id.0 as usize]);
        }
        points.push(goal);

        let destination = *regions.last().ok_or(NavError::Unreachable {
            from: start,
            to: goal,
        })?;
        let path = NavPath {
            points: self.string_pull(&points),
            regions,
            destination,
        };

        tracing::trace!(
            waypoints = path.points.len(),
            regions = path.regions.len(),
            "NavMesh path found"
        );
        *self.last_path.borrow_mut() = Some(path.clone());
        Ok(path)
    }

    /// Reduce `points` to the turn points of a line-of-sight walk.
    ///
    /// From each kept point the farthest later point with a clear line is kept next, so running the
    /// reduction again on its own output changes nothing. When no later point is visible the next
    /// one is kept anyway.
    pub fn string_pull(&self, points: &[Vec2]) -> Vec<Vec2> {
        if points.len() <= 2 {
            return points.to_vec();
        }

        let last = points.len() - 1;
        let mut out = vec![points[0]];
        let mut anchor = 0;
        while anchor < last {
            let next = (anchor + 2..=last)
                .rev()
                .find(|&j| self.line_of_sight(points[anchor], points[j]))
                .unwrap_or(anchor + 1);
            out.push(points[next]);
            anchor = next;
        }
        out
    }

    fn portal_midpoint(&self, from: NavRegionId, to: NavRegionId) -> Option<Vec2> {
        let a = self.tris.get(from.0 as usize)?;
        let b = self.tris.get(to.0 as usize)?;
        tri_edges(a)
            .into_iter()
            .find(|(p, q)| b.contains(p) && b.contains(q))
            .map(|(p, q)| p.lerp(q, 0.5))
    }

    /// Parameter along `start -> end` of the first proper crossing with a boundary edge.
    fn first_boundary_crossing(&self, start: Vec2, end: Vec2) -> Option<f64> {
        let dir = end - start;
        let mut best_t: Option<f64> = None;

        for (_, edge) in self.boundary_index.segments_near_line(start, end) {
            if let Some(t) = segment_intersection_t(start, dir, edge.a, edge.direction()) {
                // Ignore contact at the endpoints themselves.
                if t <= 1e-9 || t >= 1.0 - 1e-9 {
                    continue;
                }
                match best_t {
                    None => best_t = Some(t),
                    Some(best) if t < best => best_t = Some(t),
                    _ => {}
                }
            }
        }

        best_t
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NavMeshSerde {
    config: NavMeshConfig,
    tris: Vec<[Vec2; 3]>,
    #[serde(default)]
    holes: Vec<Polygon>,
}

#[cfg(feature = "serde")]
impl Serialize for NavMesh {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavMeshSerde {
            config: self.config,
            tris: self.tris.clone(),
            holes: self.holes.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NavMesh {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavMeshSerde::deserialize(deserializer)?;
        let mut mesh = NavMesh::from_triangles(data.config, data.tris);
        mesh.holes = data.holes;
        Ok(mesh)
    }
}

impl Navigator for NavMesh {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Result<NavPath> {
        NavMesh::find_path(self, start, goal)
    }

    fn region_at(&self, point: Vec2) -> Option<NavRegionId> {
        self.find_triangle(point)
    }

    fn region_contains(&self, region: NavRegionId, point: Vec2) -> bool {
        self.tris
            .get(region.0 as usize)
            .is_some_and(|tri| point_in_triangle(point, *tri))
    }

    fn nearest_centroid(&self, point: Vec2) -> Option<Vec2> {
        NavMesh::nearest_centroid(self, point).map(|(_, c)| c)
    }

    fn centroids_within(&self, center: Vec2, range: f64) -> Vec<Vec2> {
        NavMesh::centroids_within(self, center, range)
            .into_iter()
            .map(|(_, c)| c)
            .collect()
    }

    fn contains(&self, point: Vec2) -> bool {
        NavMesh::contains(self, point)
    }
}

fn tri_edges(tri: &[Vec2; 3]) -> [(Vec2, Vec2); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

fn tri_centroid(tri: [Vec2; 3]) -> Vec2 {
    (tri[0] + tri[1] + tri[2]) / 3.0
}

fn tri_area2(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

fn point_in_triangle(p: Vec2, tri: [Vec2; 3]) -> bool {
    let eps = 1e-9;
    let [a, b, c] = tri;
    let ab = tri_area2(a, b, p);
    let bc = tri_area2(b, c, p);
    let ca = tri_area2(c, a, p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

fn closest_point_on_triangle(p: Vec2, tri: [Vec2; 3]) -> Vec2 {
    if point_in_triangle(p, tri) {
        return p;
    }
    let [a, b, c] = tri;
    [
        Segment::new(a, b).nearest_point(p),
        Segment::new(b, c).nearest_point(p),
        Segment::new(c, a).nearest_point(p),
    ]
    .into_iter()
    .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
    .unwrap_or(a)
}

fn segment_intersection_t(p: Vec2, r: Vec2, q: Vec2, s: Vec2) -> Option<f64> {
    let denom = r.cross(s);
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let qp = q - p;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}
