use std::collections::HashSet;

use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};

use crate::{GeometryError, Polygon, Result, Vec2};

/// Constrained Delaunay triangulation of polygonal regions (holes respected).
///
/// Every ring edge becomes a constraint; faces whose centroid lies outside all regions are
/// discarded. Returned triangles are counter-clockwise.
pub fn triangulate(regions: &[Polygon]) -> Result<Vec<Polygon>> {
    let mut cdt: ConstrainedDelaunayTriangulation<Point2<f64>> =
        ConstrainedDelaunayTriangulation::new();
    let mut added: HashSet<(usize, usize)> = HashSet::new();

    for region in regions {
        for ring in region.rings() {
            let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(ring.len());
            for p in ring {
                let handle = cdt.insert(Point2::new(p.x, p.y)).map_err(|err| {
                    GeometryError::VertexRejected {
                        x: p.x,
                        y: p.y,
                        reason: format!("{err:?}"),
                    }
                })?;
                handles.push(handle);
            }

            let n = handles.len();
            for i in 0..n {
                let (from, to) = (handles[i], handles[(i + 1) % n]);
                if from == to {
                    continue;
                }
                let key = (from.index().min(to.index()), from.index().max(to.index()));
                if !added.insert(key) {
                    continue;
                }
                if !cdt.can_add_constraint(from, to) {
                    let (a, b) = (ring[i], ring[(i + 1) % n]);
                    return Err(GeometryError::ConstraintRejected {
                        ax: a.x,
                        ay: a.y,
                        bx: b.x,
                        by: b.y,
                    });
                }
                cdt.add_constraint(from, to);
            }
        }
    }

    let mut out = Vec::new();
    for face in cdt.inner_faces() {
        let [a, b, c] = face.vertices().map(|v| {
            let p = v.position();
            Vec2::new(p.x, p.y)
        });
        let centroid = (a + b + c) / 3.0;
        if regions.iter().any(|r| r.contains(centroid)) {
            out.push(Polygon::triangle(a, b, c));
        }
    }
    Ok(out)
}
