//! Polygonal boundary representation of a solid.
//!
//! A [`BoundaryMesh`] is a closed set of planar convex polygons with outward
//! winding (counter-clockwise seen from outside). T-junctions are allowed:
//! the boolean evaluator and the volume integral only need the surface to be
//! closed, not vertex-conforming.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use profile_types::AppliedFeature;

use crate::types::{KernelError, RenderMesh};

/// Oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    /// Plane through a planar polygon using Newell's method.
    ///
    /// Returns `None` when the points span no area.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Plane> {
        if points.len() < 3 {
            return None;
        }
        let mut n = Vector3::<f64>::zeros();
        let mut centroid = Vector3::<f64>::zeros();
        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
            centroid += a.coords;
        }
        let len = n.norm();
        if !len.is_finite() || len < 1e-15 {
            return None;
        }
        let normal = n / len;
        centroid /= points.len() as f64;
        Some(Plane {
            normal,
            w: normal.dot(&centroid),
        })
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }
}

/// Planar convex polygon with a cached supporting plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3<f64>>) -> Result<Self, KernelError> {
        let plane = Plane::from_points(&vertices).ok_or_else(|| KernelError::DegeneratePolygon {
            reason: format!("{} vertices span no area", vertices.len()),
        })?;
        Ok(Self { vertices, plane })
    }

    /// Build a polygon that shares an existing plane (used by splitting).
    pub fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    pub fn area(&self) -> f64 {
        let mut sum = Vector3::zeros();
        let origin = self.vertices[0].coords;
        for i in 1..self.vertices.len().saturating_sub(1) {
            let a = self.vertices[i].coords - origin;
            let b = self.vertices[i + 1].coords - origin;
            sum += a.cross(&b);
        }
        0.5 * sum.norm()
    }

    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn intersects(&self, other: &BoundingBox, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] + tol && other.min[i] <= self.max[i] + tol)
    }

    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn contains(&self, p: &Point3<f64>, tol: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tol && p[i] <= self.max[i] + tol)
    }
}

/// Side-channel data carried with a mesh for the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub applied_features: Vec<AppliedFeature>,
}

/// The evolving solid that machining features cut into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryMesh {
    pub polygons: Vec<Polygon>,
    pub metadata: MeshMetadata,
}

impl BoundaryMesh {
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            metadata: MeshMetadata::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = Some(label.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Enclosed volume by the divergence theorem.
    pub fn volume(&self) -> f64 {
        let mut six_v = 0.0;
        for poly in &self.polygons {
            let v0 = poly.vertices[0].coords;
            for i in 1..poly.vertices.len().saturating_sub(1) {
                let v1 = poly.vertices[i].coords;
                let v2 = poly.vertices[i + 1].coords;
                six_v += v0.dot(&v1.cross(&v2));
            }
        }
        six_v / 6.0
    }

    pub fn surface_area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self.polygons.iter().flat_map(|p| p.vertices.iter());
        let first = points.next()?;
        let mut bb = BoundingBox {
            min: *first,
            max: *first,
        };
        for p in points {
            for i in 0..3 {
                bb.min[i] = bb.min[i].min(p[i]);
                bb.max[i] = bb.max[i].max(p[i]);
            }
        }
        Some(bb)
    }

    pub fn is_finite(&self) -> bool {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter())
            .all(|v| v.coords.iter().all(|c| c.is_finite()))
    }

    /// Rigidly move the mesh. Metadata is carried over unchanged.
    pub fn transformed(&self, iso: &Isometry3<f64>) -> BoundaryMesh {
        let polygons = self
            .polygons
            .iter()
            .map(|poly| {
                let vertices: Vec<Point3<f64>> =
                    poly.vertices.iter().map(|v| iso.transform_point(v)).collect();
                let normal = iso.transform_vector(&poly.plane.normal);
                let w = normal.dot(&vertices[0].coords);
                Polygon::with_plane(vertices, Plane { normal, w })
            })
            .collect();
        BoundaryMesh {
            polygons,
            metadata: self.metadata.clone(),
        }
    }

    /// Structural problems, one human-readable line each. Empty means sound.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (i, poly) in self.polygons.iter().enumerate() {
            if poly.vertices.len() < 3 {
                problems.push(format!("polygon {i} has {} vertices", poly.vertices.len()));
                continue;
            }
            if poly
                .vertices
                .iter()
                .any(|v| v.coords.iter().any(|c| !c.is_finite()))
            {
                problems.push(format!("polygon {i} has non-finite coordinates"));
            }
            if (poly.plane.normal.norm() - 1.0).abs() > 1e-6 {
                problems.push(format!("polygon {i} has a non-unit plane normal"));
            }
        }
        problems
    }

    /// Fan-triangulate into flat buffers for the renderer.
    pub fn to_render_mesh(&self) -> RenderMesh {
        let mut mesh = RenderMesh::default();
        for poly in &self.polygons {
            let base = (mesh.vertices.len() / 3) as u32;
            let n = poly.plane.normal;
            for v in &poly.vertices {
                mesh.vertices.extend([v.x as f32, v.y as f32, v.z as f32]);
                mesh.normals.extend([n.x as f32, n.y as f32, n.z as f32]);
            }
            for i in 1..poly.vertices.len().saturating_sub(1) as u32 {
                mesh.indices.extend([base, base + i, base + i + 1]);
            }
        }
        mesh
    }
}
