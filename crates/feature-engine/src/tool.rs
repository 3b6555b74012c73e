//! Cutting tool placement.
//!
//! Tools are built canonically along +Y by [`make_cylinder`] and then moved
//! onto the feature. Only axis-aligned orientations are produced: the tool
//! axis follows the dominant component of the transformed surface normal.

use std::f64::consts::FRAC_PI_2;

use machining_ops::ResolvedDepth;
use mesh_kernel::{make_cylinder, BoundaryMesh, KernelError};
use nalgebra::{Isometry3, Point3, Vector3};
use profile_types::{Axis, StandardPosition};

/// Where and how large a cylindrical tool is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolPlacement {
    pub center: Point3<f64>,
    /// Unit direction the tool is drilled against (outward surface normal).
    pub normal: Vector3<f64>,
    pub axis: Axis,
    pub radius: f64,
    pub length: f64,
}

impl ToolPlacement {
    /// Through tool: `depth.value` long, starting half a wall above the
    /// highest surface point of the footprint, so it overhangs the wall on
    /// both sides. On flat faces it is centred on the wall mid-plane.
    pub fn through(position: &StandardPosition, depth: &ResolvedDepth, radius: f64) -> Self {
        let normal = unit_normal(position);
        let surface = Point3::from(position.surface_point());
        let top = surface + normal * (depth.surface_rise + 0.5 * depth.nominal_thickness);
        Self {
            center: top - normal * (0.5 * depth.value),
            normal,
            axis: dominant_axis(&normal),
            radius,
            length: depth.value,
        }
    }

    /// Blind tool: starts `clearance` outside the surface and bottoms out at
    /// coordinate depth plus blind depth below it.
    pub fn blind(
        position: &StandardPosition,
        depth: &ResolvedDepth,
        radius: f64,
        clearance: f64,
    ) -> Self {
        let normal = unit_normal(position);
        let surface = Point3::from(position.surface_point());
        let top = surface + normal * clearance;
        let bottom = surface - normal * (position.depth + depth.value);
        Self {
            center: nalgebra::center(&top, &bottom),
            normal,
            axis: dominant_axis(&normal),
            radius,
            length: (top - bottom).norm(),
        }
    }

    /// End of the tool outside the material.
    pub fn entry(&self) -> Point3<f64> {
        self.center + self.normal * (0.5 * self.length)
    }

    /// End of the tool inside (or beyond) the material.
    pub fn exit(&self) -> Point3<f64> {
        self.center - self.normal * (0.5 * self.length)
    }

    /// Rotation taking the canonical +Y cylinder onto `axis`, as an
    /// axis-angle vector.
    pub fn rotation(&self) -> Vector3<f64> {
        match self.axis {
            Axis::Y => Vector3::zeros(),
            Axis::Z => Vector3::x() * FRAC_PI_2,
            Axis::X => Vector3::z() * FRAC_PI_2,
        }
    }

    pub fn build(&self, segments: usize) -> Result<BoundaryMesh, KernelError> {
        let canonical = make_cylinder(self.radius, self.length, segments)?;
        let iso = Isometry3::new(self.center.coords, self.rotation());
        Ok(canonical.transformed(&iso))
    }
}

fn unit_normal(position: &StandardPosition) -> Vector3<f64> {
    let [x, y, z] = position.normal;
    let n = Vector3::new(x, y, z);
    let len = n.norm();
    if len > 0.0 {
        n / len
    } else {
        Vector3::y()
    }
}

/// Axis carrying the largest normal component; ties resolve Y, Z, X.
pub fn dominant_axis(normal: &Vector3<f64>) -> Axis {
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    if ay >= az && ay >= ax {
        Axis::Y
    } else if az >= ax {
        Axis::Z
    } else {
        Axis::X
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use profile_types::Face;

    fn at(position: [f64; 3], normal: [f64; 3], depth: f64) -> StandardPosition {
        StandardPosition {
            position,
            normal,
            face: Face::Top,
            depth,
        }
    }

    fn through_depth(nominal: f64) -> ResolvedDepth {
        ResolvedDepth {
            value: 2.0 * nominal,
            nominal_thickness: nominal,
            through: true,
            surface_rise: 0.0,
        }
    }

    #[test]
    fn through_tool_straddles_the_wall() {
        let p = at([0.0, 100.0, 0.0], [0.0, 1.0, 0.0], 0.0);
        let tool = ToolPlacement::through(&p, &through_depth(15.0), 10.0);
        assert_eq!(tool.axis, Axis::Y);
        assert_relative_eq!(tool.center.y, 92.5);
        assert_relative_eq!(tool.entry().y, 107.5);
        assert_relative_eq!(tool.exit().y, 77.5);
    }

    #[test]
    fn through_tool_clears_a_rising_surface() {
        let depth = ResolvedDepth {
            value: 2.0 * 14.0 + 2.5,
            nominal_thickness: 14.0,
            through: true,
            surface_rise: 2.5,
        };
        let p = at([0.0, 30.0, 40.0], [0.0, 1.0, 0.0], 0.0);
        let tool = ToolPlacement::through(&p, &depth, 2.0);
        assert_relative_eq!(tool.entry().y, 30.0 + 2.5 + 7.0);
        assert_relative_eq!(tool.exit().y, 30.0 - 14.0 - 7.0);
    }

    #[test]
    fn blind_tool_starts_outside_the_surface() {
        let depth = ResolvedDepth {
            value: 6.0,
            nominal_thickness: 15.0,
            through: false,
            surface_rise: 0.0,
        };
        let p = at([0.0, -98.0, 0.0], [0.0, -1.0, 0.0], 2.0);
        let tool = ToolPlacement::blind(&p, &depth, 8.0, 0.5);
        assert_relative_eq!(tool.entry().y, -100.5);
        assert_relative_eq!(tool.exit().y, -92.0);
        assert_relative_eq!(tool.length, 8.5);
    }

    #[test]
    fn orientation_follows_the_normal() {
        assert_eq!(dominant_axis(&Vector3::new(0.0, 0.0, -1.0)), Axis::Z);
        assert_eq!(dominant_axis(&Vector3::new(1.0, 0.0, 0.0)), Axis::X);
        assert_eq!(dominant_axis(&Vector3::new(0.2, -0.9, 0.1)), Axis::Y);
    }

    #[test]
    fn built_tool_lies_along_its_axis() {
        let p = at([10.0, 0.0, 4.0], [0.0, 0.0, 1.0], 0.0);
        let tool = ToolPlacement::through(&p, &through_depth(8.0), 5.0);
        let bbox = tool.build(16).unwrap().bounding_box().unwrap();
        assert_relative_eq!(bbox.min.z, -8.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, 8.0, epsilon = 1e-9);
        assert!(bbox.extents().y <= 10.0 + 1e-9);

        let p = at([500.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.0);
        let tool = ToolPlacement::through(&p, &through_depth(100.0), 5.0);
        let bbox = tool.build(16).unwrap().bounding_box().unwrap();
        assert_relative_eq!(bbox.min.x, 350.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x, 550.0, epsilon = 1e-9);
    }
}
