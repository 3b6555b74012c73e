use std::f64::consts::TAU;

use nalgebra::Point3;
use profile_types::ProfileDimensions;
use tracing::{info, instrument};

use crate::mesh::{BoundaryMesh, Polygon};
use crate::section::CrossSection;
use crate::types::KernelError;

fn check_extent(parameter: &'static str, value: f64) -> Result<f64, KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(KernelError::InvalidDimension { parameter, value })
    }
}

/// Build an axis-aligned box between two opposite corners.
#[instrument]
pub fn make_box(min: Point3<f64>, max: Point3<f64>) -> Result<BoundaryMesh, KernelError> {
    check_extent("box x extent", max.x - min.x)?;
    check_extent("box y extent", max.y - min.y)?;
    check_extent("box z extent", max.z - min.z)?;
    info!(min = ?[min.x, min.y, min.z], max = ?[max.x, max.y, max.z], "creating box primitive");

    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let v = [
        Point3::new(x0, y0, z0), // 0: front-bottom-left
        Point3::new(x1, y0, z0), // 1: front-bottom-right
        Point3::new(x1, y1, z0), // 2: front-top-right
        Point3::new(x0, y1, z0), // 3: front-top-left
        Point3::new(x0, y0, z1), // 4: back-bottom-left
        Point3::new(x1, y0, z1), // 5: back-bottom-right
        Point3::new(x1, y1, z1), // 6: back-top-right
        Point3::new(x0, y1, z1), // 7: back-top-left
    ];
    // Counter-clockwise seen from outside.
    let face_defs: [[usize; 4]; 6] = [
        [0, 3, 2, 1], // z = z0
        [4, 5, 6, 7], // z = z1
        [0, 4, 7, 3], // x = x0
        [1, 2, 6, 5], // x = x1
        [0, 1, 5, 4], // y = y0
        [3, 7, 6, 2], // y = y1
    ];
    let polygons = face_defs
        .iter()
        .map(|idx| Polygon::new(idx.iter().map(|&i| v[i]).collect()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BoundaryMesh::from_polygons(polygons))
}

/// Build a faceted cylinder along +Y, centred on the origin.
///
/// The circle is approximated by an inscribed regular `segments`-gon.
#[instrument]
pub fn make_cylinder(
    radius: f64,
    height: f64,
    segments: usize,
) -> Result<BoundaryMesh, KernelError> {
    check_extent("radius", radius)?;
    check_extent("height", height)?;
    if segments < 3 {
        return Err(KernelError::InsufficientSegments {
            required: 3,
            provided: segments,
        });
    }
    info!(radius, height, segments, "creating cylinder primitive");

    let half = 0.5 * height;
    let ring: Vec<(f64, f64)> = (0..segments)
        .map(|i| {
            let theta = TAU * i as f64 / segments as f64;
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    let bottom = |(x, z): (f64, f64)| Point3::new(x, -half, z);
    let top = |(x, z): (f64, f64)| Point3::new(x, half, z);

    let mut polygons = Vec::with_capacity(segments + 2);
    polygons.push(Polygon::new(ring.iter().map(|&p| bottom(p)).collect())?);
    polygons.push(Polygon::new(ring.iter().rev().map(|&p| top(p)).collect())?);
    for i in 0..segments {
        let (a, b) = (ring[i], ring[(i + 1) % segments]);
        polygons.push(Polygon::new(vec![bottom(a), top(a), top(b), bottom(b)])?);
    }
    Ok(BoundaryMesh::from_polygons(polygons))
}

/// Volume of the prism returned by [`make_cylinder`].
pub fn faceted_cylinder_volume(radius: f64, height: f64, segments: usize) -> f64 {
    let n = segments as f64;
    0.5 * n * radius * radius * (TAU / n).sin() * height
}

/// Build the stock solid for a profile in the standard frame.
///
/// The profile runs along X from `-L/2` to `L/2`.
#[instrument(skip(dims), fields(family = %dims.family(), length = dims.length()))]
pub fn make_profile_solid(
    dims: &ProfileDimensions,
    segments: usize,
) -> Result<BoundaryMesh, KernelError> {
    let section = CrossSection::for_dimensions(dims, segments)?;
    let half = 0.5 * dims.length();
    let solid = section.extrude(-half, half)?.with_label(dims.family().as_str());
    info!(
        polygons = solid.polygon_count(),
        section_area = section.area(),
        "created profile stock solid"
    );
    Ok(solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use profile_types::ProfileFamily;

    #[test]
    fn test_make_box_rejects_inverted_corners() {
        let err = make_box(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, KernelError::InvalidDimension { .. }));
    }

    #[test]
    fn test_box_normals_point_outward() {
        let mesh = make_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).unwrap();
        for poly in &mesh.polygons {
            let c = poly.centroid();
            assert!(poly.plane.normal.dot(&c.coords) > 0.0);
        }
    }

    #[test]
    fn test_cylinder_volume_and_orientation() {
        let mesh = make_cylinder(10.0, 30.0, 32).unwrap();
        let expected = faceted_cylinder_volume(10.0, 30.0, 32);
        assert_relative_eq!(mesh.volume(), expected, epsilon = 1e-9);
        assert_eq!(mesh.polygon_count(), 34);
        let bb = mesh.bounding_box().unwrap();
        assert_relative_eq!(bb.min.y, -15.0);
        assert_relative_eq!(bb.max.y, 15.0);
        for poly in &mesh.polygons {
            assert!(poly.plane.normal.dot(&poly.centroid().coords) > 0.0);
        }
    }

    #[test]
    fn test_cylinder_needs_three_segments() {
        assert_eq!(
            make_cylinder(1.0, 1.0, 2).unwrap_err(),
            KernelError::InsufficientSegments {
                required: 3,
                provided: 2
            }
        );
    }

    #[test]
    fn test_profile_solid_is_centred() {
        let dims = ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)
            .unwrap()
            .with_flange_thickness(15.0)
            .unwrap()
            .with_web_thickness(8.0)
            .unwrap();
        let solid = make_profile_solid(&dims, 32).unwrap();
        let bb = solid.bounding_box().unwrap();
        assert_relative_eq!(bb.min, Point3::new(-500.0, -100.0, -50.0));
        assert_relative_eq!(bb.max, Point3::new(500.0, 100.0, 50.0));
        assert_eq!(solid.metadata.label.as_deref(), Some("I_PROFILE"));
    }

    #[test]
    fn test_plate_lies_flat() {
        let dims = ProfileDimensions::new(ProfileFamily::Plate, 400.0, 300.0, 10.0)
            .unwrap()
            .with_web_thickness(10.0)
            .unwrap();
        let solid = make_profile_solid(&dims, 32).unwrap();
        let bb = solid.bounding_box().unwrap();
        assert_relative_eq!(bb.extents(), nalgebra::Vector3::new(400.0, 10.0, 300.0));
        assert_relative_eq!(solid.volume(), 400.0 * 300.0 * 10.0, epsilon = 1e-6);
    }
}
