//! Profile cross-sections and their extrusion along the length axis.
//!
//! Sections are drawn in the `(y, z)` plane of the standard frame: `y` is the
//! vertical height axis and `z` the transverse width axis, both centred.

use std::f64::consts::TAU;

use nalgebra::Point3;
use profile_types::{ProfileDimensions, ProfileFamily};

use crate::mesh::{BoundaryMesh, Polygon};
use crate::types::KernelError;

/// A point `[y, z]` in the section plane.
pub type SectionPoint = [f64; 2];

/// Signed area of a closed loop (positive = counter-clockwise).
fn signed_area(points: &[SectionPoint]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let [y0, z0] = points[i];
            let [y1, z1] = points[(i + 1) % n];
            y0 * z1 - y1 * z0
        })
        .sum::<f64>()
        * 0.5
}

fn rect(y0: f64, y1: f64, z0: f64, z1: f64) -> Vec<SectionPoint> {
    vec![[y0, z0], [y0, z1], [y1, z1], [y1, z0]]
}

fn oriented(mut points: Vec<SectionPoint>, positive: bool) -> Vec<SectionPoint> {
    if (signed_area(&points) > 0.0) != positive {
        points.reverse();
    }
    points
}

fn require_thinner(what: &str, thickness: f64, limit: f64) -> Result<(), KernelError> {
    if thickness < limit {
        Ok(())
    } else {
        Err(KernelError::InvalidSection {
            reason: format!("{what} {thickness} must be less than {limit}"),
        })
    }
}

/// Planar cross-section of a profile.
///
/// The filled region is covered by convex `pieces`; `loops` are the boundary
/// loops (outer loops counter-clockwise, hole loops clockwise) that become the
/// side walls after extrusion.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    pieces: Vec<Vec<SectionPoint>>,
    loops: Vec<Vec<SectionPoint>>,
}

impl CrossSection {
    fn new(
        pieces: Vec<Vec<SectionPoint>>,
        outer: Vec<Vec<SectionPoint>>,
        holes: Vec<Vec<SectionPoint>>,
    ) -> Self {
        let pieces = pieces.into_iter().map(|p| oriented(p, true)).collect();
        let loops = outer
            .into_iter()
            .map(|l| oriented(l, true))
            .chain(holes.into_iter().map(|l| oriented(l, false)))
            .collect();
        Self { pieces, loops }
    }

    /// Build the stock section for a profile family.
    ///
    /// `segments` is only used by round tubes.
    pub fn for_dimensions(dims: &ProfileDimensions, segments: usize) -> Result<Self, KernelError> {
        let h = 0.5 * dims.height();
        let w = 0.5 * dims.width();
        match dims.family() {
            ProfileFamily::IProfile => {
                let tf = dims.nominal_flange_thickness();
                let tw = dims.nominal_web_thickness();
                require_thinner("flange thickness", tf, h)?;
                require_thinner("web thickness", tw, dims.width())?;
                let (a, b) = (h - tf, 0.5 * tw);
                Ok(Self::new(
                    vec![rect(a, h, -w, w), rect(-a, a, -b, b), rect(-h, -a, -w, w)],
                    vec![vec![
                        [-h, -w],
                        [-h, w],
                        [-a, w],
                        [-a, b],
                        [a, b],
                        [a, w],
                        [h, w],
                        [h, -w],
                        [a, -w],
                        [a, -b],
                        [-a, -b],
                        [-a, -w],
                    ]],
                    vec![],
                ))
            }
            ProfileFamily::UProfile => {
                let tf = dims.nominal_flange_thickness();
                let tw = dims.nominal_web_thickness();
                require_thinner("flange thickness", tf, h)?;
                require_thinner("web thickness", tw, dims.width())?;
                let (a, c) = (h - tf, -w + tw);
                Ok(Self::new(
                    vec![rect(-h, h, -w, c), rect(a, h, c, w), rect(-h, -a, c, w)],
                    vec![vec![
                        [-h, -w],
                        [-h, w],
                        [-a, w],
                        [-a, c],
                        [a, c],
                        [a, w],
                        [h, w],
                        [h, -w],
                    ]],
                    vec![],
                ))
            }
            ProfileFamily::LProfile => {
                let tf = dims.nominal_flange_thickness();
                let tw = dims.nominal_web_thickness();
                require_thinner("leg thickness", tf, dims.height())?;
                require_thinner("leg thickness", tw, dims.width())?;
                let (a, c) = (-h + tf, -w + tw);
                Ok(Self::new(
                    vec![rect(-h, h, -w, c), rect(-h, a, c, w)],
                    vec![vec![[-h, -w], [-h, w], [a, w], [a, c], [h, c], [h, -w]]],
                    vec![],
                ))
            }
            ProfileFamily::TProfile => {
                let tf = dims.nominal_flange_thickness();
                let tw = dims.nominal_web_thickness();
                require_thinner("flange thickness", tf, dims.height())?;
                require_thinner("stem thickness", tw, dims.width())?;
                let (a, b) = (h - tf, 0.5 * tw);
                Ok(Self::new(
                    vec![rect(a, h, -w, w), rect(-h, a, -b, b)],
                    vec![vec![
                        [-h, -b],
                        [-h, b],
                        [a, b],
                        [a, w],
                        [h, w],
                        [h, -w],
                        [a, -w],
                        [a, -b],
                    ]],
                    vec![],
                ))
            }
            ProfileFamily::TubeRect => {
                let t = dims.nominal_wall_thickness();
                require_thinner("wall thickness", t, h.min(w))?;
                let (hi, wi) = (h - t, w - t);
                Ok(Self::new(
                    vec![
                        rect(hi, h, -w, w),
                        rect(-h, -hi, -w, w),
                        rect(-hi, hi, -w, -wi),
                        rect(-hi, hi, wi, w),
                    ],
                    vec![rect(-h, h, -w, w)],
                    vec![rect(-hi, hi, -wi, wi)],
                ))
            }
            ProfileFamily::TubeRound => {
                if segments < 3 {
                    return Err(KernelError::InsufficientSegments {
                        required: 3,
                        provided: segments,
                    });
                }
                let r = h;
                let t = dims.nominal_wall_thickness();
                require_thinner("wall thickness", t, r)?;
                let ri = r - t;
                let ring = |radius: f64| -> Vec<SectionPoint> {
                    (0..segments)
                        .map(|i| {
                            let theta = TAU * i as f64 / segments as f64;
                            [radius * theta.cos(), radius * theta.sin()]
                        })
                        .collect()
                };
                let outer = ring(r);
                let inner = ring(ri);
                let pieces = (0..segments)
                    .map(|i| {
                        let j = (i + 1) % segments;
                        vec![outer[i], outer[j], inner[j], inner[i]]
                    })
                    .collect();
                Ok(Self::new(pieces, vec![outer], vec![inner]))
            }
            ProfileFamily::Plate => {
                let t = 0.5 * dims.section_width();
                let section = rect(-t, t, -h, h);
                Ok(Self::new(vec![section.clone()], vec![section], vec![]))
            }
            ProfileFamily::Unknown => {
                let section = rect(-h, h, -w, w);
                Ok(Self::new(vec![section.clone()], vec![section], vec![]))
            }
        }
    }

    pub fn pieces(&self) -> &[Vec<SectionPoint>] {
        &self.pieces
    }

    pub fn loops(&self) -> &[Vec<SectionPoint>] {
        &self.loops
    }

    /// Filled area of the section.
    pub fn area(&self) -> f64 {
        self.pieces.iter().map(|p| signed_area(p)).sum()
    }

    /// Sweep the section along X from `x0` to `x1` into a closed solid.
    pub fn extrude(&self, x0: f64, x1: f64) -> Result<BoundaryMesh, KernelError> {
        let span = x1 - x0;
        if !span.is_finite() || span <= 0.0 {
            return Err(KernelError::InvalidDimension {
                parameter: "extrusion length",
                value: span,
            });
        }
        let at = |x: f64, [y, z]: SectionPoint| Point3::new(x, y, z);
        let mut polygons = Vec::new();

        for piece in &self.pieces {
            polygons.push(Polygon::new(piece.iter().map(|&p| at(x1, p)).collect())?);
            polygons.push(Polygon::new(piece.iter().rev().map(|&p| at(x0, p)).collect())?);
        }
        for outline in &self.loops {
            let n = outline.len();
            for i in 0..n {
                let (a, b) = (outline[i], outline[(i + 1) % n]);
                polygons.push(Polygon::new(vec![at(x0, a), at(x0, b), at(x1, b), at(x1, a)])?);
            }
        }
        Ok(BoundaryMesh::from_polygons(polygons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn loops_area(section: &CrossSection) -> f64 {
        section.loops().iter().map(|l| signed_area(l)).sum()
    }

    #[test]
    fn i_section_area_matches_flanges_and_web() {
        let dims = ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)
            .unwrap()
            .with_flange_thickness(15.0)
            .unwrap()
            .with_web_thickness(8.0)
            .unwrap();
        let section = CrossSection::for_dimensions(&dims, 16).unwrap();
        let expected = 2.0 * 100.0 * 15.0 + 8.0 * (200.0 - 30.0);
        assert_relative_eq!(section.area(), expected, epsilon = 1e-9);
        assert_relative_eq!(loops_area(&section), expected, epsilon = 1e-9);
    }

    #[test]
    fn tube_section_hole_loop_is_clockwise() {
        let dims = ProfileDimensions::new(ProfileFamily::TubeRect, 500.0, 100.0, 60.0)
            .unwrap()
            .with_wall_thickness(5.0)
            .unwrap();
        let section = CrossSection::for_dimensions(&dims, 16).unwrap();
        assert_eq!(section.loops().len(), 2);
        assert!(signed_area(&section.loops()[1]) < 0.0);
        assert_relative_eq!(section.area(), 100.0 * 60.0 - 90.0 * 50.0, epsilon = 1e-9);
        assert_relative_eq!(loops_area(&section), section.area(), epsilon = 1e-9);
    }

    #[test]
    fn every_family_extrudes_to_area_times_length() {
        for family in ProfileFamily::ALL {
            let dims = ProfileDimensions::new(family, 300.0, 120.0, 80.0)
                .unwrap()
                .with_web_thickness(6.0)
                .unwrap()
                .with_flange_thickness(10.0)
                .unwrap()
                .with_wall_thickness(5.0)
                .unwrap();
            let section = CrossSection::for_dimensions(&dims, 24).unwrap();
            let solid = section.extrude(-150.0, 150.0).unwrap();
            assert_relative_eq!(solid.volume(), section.area() * 300.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn oversized_wall_is_rejected() {
        let dims = ProfileDimensions::new(ProfileFamily::TubeRect, 500.0, 100.0, 60.0)
            .unwrap()
            .with_wall_thickness(40.0)
            .unwrap();
        assert!(matches!(
            CrossSection::for_dimensions(&dims, 16),
            Err(KernelError::InvalidSection { .. })
        ));
    }
}
