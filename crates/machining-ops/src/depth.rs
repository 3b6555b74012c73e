use profile_types::{Face, HoleFeature, ProfileDimensions};
use serde::{Deserialize, Serialize};

use crate::config::SurfaceOffset;
use crate::types::DepthError;

/// Through tools are this many times longer than the material they cross.
pub const THROUGH_PENETRATION_FACTOR: f64 = 2.0;

/// Penetration depth resolved for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDepth {
    /// Tool penetration below the surface; always positive.
    pub value: f64,
    /// Material thickness behind the face.
    pub nominal_thickness: f64,
    pub through: bool,
    /// How far the surface rises above the feature's surface point within
    /// the hole's footprint. Zero on flat faces.
    #[serde(default)]
    pub surface_rise: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthResolver;

impl DepthResolver {
    /// Thickness of material behind `face`.
    pub fn nominal_thickness(&self, face: Face, dims: &ProfileDimensions) -> f64 {
        match face {
            Face::Top | Face::Bottom => dims.nominal_flange_thickness(),
            Face::Left | Face::Right => dims.nominal_web_thickness(),
            Face::Front | Face::Back => dims.section_width(),
        }
    }

    pub fn resolve(
        &self,
        face: Face,
        dims: &ProfileDimensions,
        is_through: bool,
        explicit_depth: Option<f64>,
    ) -> Result<ResolvedDepth, DepthError> {
        let nominal_thickness = self.nominal_thickness(face, dims);
        if is_through {
            return Ok(ResolvedDepth {
                value: nominal_thickness * THROUGH_PENETRATION_FACTOR,
                nominal_thickness,
                through: true,
                surface_rise: 0.0,
            });
        }
        match explicit_depth {
            Some(d) if d.is_finite() && d > 0.0 => Ok(ResolvedDepth {
                value: d,
                nominal_thickness,
                through: false,
                surface_rise: 0.0,
            }),
            value => Err(DepthError::NonPositiveBlindDepth { value }),
        }
    }

    /// Depth for `feature` on `face`, where `surface` is the face's surface
    /// rule and `offset` the hole's centred transverse coordinate.
    pub fn resolve_feature(
        &self,
        feature: &HoleFeature,
        face: Face,
        dims: &ProfileDimensions,
        surface: SurfaceOffset,
        offset: f64,
    ) -> Result<ResolvedDepth, DepthError> {
        match surface {
            SurfaceOffset::RoundSurface if feature.is_through => {
                self.through_round(dims, offset, feature.radius())
            }
            _ => self.resolve(face, dims, feature.is_through, feature.depth),
        }
    }

    /// Through depth on a round tube, drilled parallel to the face normal.
    ///
    /// Away from the crown the drill runs along a chord of the ring, so the
    /// wall it crosses is measured from the surface point down to the bore at
    /// the footprint's far edge. The tool overhangs by half that wall on both
    /// ends, and the lower overhang must stay clear of the opposite wall.
    fn through_round(
        &self,
        dims: &ProfileDimensions,
        offset: f64,
        radius: f64,
    ) -> Result<ResolvedDepth, DepthError> {
        let outer = 0.5 * dims.height();
        let inner = outer - dims.nominal_wall_thickness();
        let near = (offset.abs() - radius).max(0.0);
        let far = offset.abs() + radius;
        let not_through = DepthError::ChordAlongWall { offset, radius };
        if !(far < inner) {
            return Err(not_through);
        }

        let surface = (outer * outer - offset * offset).max(0.0).sqrt();
        let crown = (outer * outer - near * near).sqrt();
        let floor = (inner * inner - far * far).sqrt();
        let wall = surface - floor;
        if !(floor >= 0.5 * wall) {
            return Err(not_through);
        }
        let surface_rise = crown - surface;
        Ok(ResolvedDepth {
            value: wall * THROUGH_PENETRATION_FACTOR + surface_rise,
            nominal_thickness: wall,
            through: true,
            surface_rise,
        })
    }
}
