//! Binary space partitioning tree over boundary polygons.
//!
//! Each node stores a splitting plane, the polygons coplanar with it and the
//! subtrees in front of and behind it. Space behind every plane on a path to
//! an empty back slot is inside the solid.

use crate::mesh::{Plane, Polygon};

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Destination lists for [`split_polygon`].
struct SplitTargets<'a> {
    coplanar_front: &'a mut Vec<Polygon>,
    coplanar_back: &'a mut Vec<Polygon>,
    front: &'a mut Vec<Polygon>,
    back: &'a mut Vec<Polygon>,
}

/// Classify `poly` against `plane` and route it (or its split halves) into
/// the target lists.
fn split_polygon(plane: &Plane, poly: &Polygon, eps: f64, out: SplitTargets<'_>) {
    let mut polygon_type = COPLANAR;
    let types: Vec<u8> = poly
        .vertices
        .iter()
        .map(|v| {
            let t = plane.signed_distance(v);
            let ty = if t < -eps {
                BACK
            } else if t > eps {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            ty
        })
        .collect();

    match polygon_type {
        COPLANAR => {
            if plane.normal.dot(&poly.plane.normal) > 0.0 {
                out.coplanar_front.push(poly.clone());
            } else {
                out.coplanar_back.push(poly.clone());
            }
        }
        FRONT => out.front.push(poly.clone()),
        BACK => out.back.push(poly.clone()),
        _ => {
            let n = poly.vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (poly.vertices[i], poly.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let denom = plane.normal.dot(&(vj - vi));
                    let t = (plane.w - plane.normal.dot(&vi.coords)) / denom;
                    let v = vi + (vj - vi) * t;
                    f.push(v);
                    b.push(v);
                }
            }
            if f.len() >= 3 {
                out.front.push(Polygon::with_plane(f, poly.plane));
            }
            if b.len() >= 3 {
                out.back.push(Polygon::with_plane(b, poly.plane));
            }
        }
    }
}

/// A node of the BSP tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
    eps: f64,
}

impl Node {
    pub fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut node = Node {
            eps,
            ..Node::default()
        };
        node.build(polygons);
        node
    }

    fn child(eps: f64) -> Box<Node> {
        Box::new(Node {
            eps,
            ..Node::default()
        })
    }

    /// Swap solid space and empty space.
    pub fn invert(&mut self) {
        for poly in &mut self.polygons {
            poly.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for poly in &polygons {
            split_polygon(
                plane,
                poly,
                self.eps,
                SplitTargets {
                    coplanar_front: &mut coplanar_front,
                    coplanar_back: &mut coplanar_back,
                    front: &mut front,
                    back: &mut back,
                },
            );
        }
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Clip every polygon in this tree against `other`.
    pub fn clip_to(&mut self, other: &Node) {
        let polygons = std::mem::take(&mut self.polygons);
        self.polygons = other.clip_polygons(polygons);
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_into(out);
        }
        if let Some(back) = &self.back {
            back.collect_into(out);
        }
    }

    /// Insert polygons, splitting them by the existing planes.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for poly in &polygons {
            split_polygon(
                &plane,
                poly,
                self.eps,
                SplitTargets {
                    coplanar_front: &mut coplanar_front,
                    coplanar_back: &mut coplanar_back,
                    front: &mut front,
                    back: &mut back,
                },
            );
        }
        self.polygons.append(&mut coplanar_front);
        self.polygons.append(&mut coplanar_back);

        if !front.is_empty() {
            let eps = self.eps;
            self.front.get_or_insert_with(|| Node::child(eps)).build(front);
        }
        if !back.is_empty() {
            let eps = self.eps;
            self.back.get_or_insert_with(|| Node::child(eps)).build(back);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::make_box;
    use nalgebra::Point3;

    #[test]
    fn clip_removes_polygons_inside_solid() {
        let solid = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)).unwrap();
        let tree = Node::new(solid.polygons, 1e-5);

        let inside = make_box(Point3::new(0.5, 0.5, 0.5), Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(tree.clip_polygons(inside.polygons).is_empty());

        let outside = make_box(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0)).unwrap();
        assert_eq!(tree.clip_polygons(outside.polygons).len(), 6);
    }

    #[test]
    fn invert_twice_is_identity() {
        let solid = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap();
        let mut tree = Node::new(solid.polygons.clone(), 1e-5);
        tree.invert();
        tree.invert();
        assert_eq!(tree.all_polygons().len(), solid.polygons.len());
    }

    #[test]
    fn spanning_polygon_is_split_in_two() {
        let plane = Plane {
            normal: nalgebra::Vector3::x(),
            w: 0.5,
        };
        let square = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let (mut cf, mut cb, mut f, mut b) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        split_polygon(
            &plane,
            &square,
            1e-5,
            SplitTargets {
                coplanar_front: &mut cf,
                coplanar_back: &mut cb,
                front: &mut f,
                back: &mut b,
            },
        );
        assert_eq!((f.len(), b.len()), (1, 1));
        assert!((f[0].area() - 0.5).abs() < 1e-12);
        assert!((b[0].area() - 0.5).abs() < 1e-12);
        assert!(cf.is_empty() && cb.is_empty());
    }
}
