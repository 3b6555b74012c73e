use profile_types::{Face, FeatureRecord, HoleFeature, ProfileDimensions};

use crate::bounds::FaceBoundsCalculator;
use crate::config::{AxisOrigin, MachiningConfig, Tolerance, TransformRuleTable};
use crate::depth::DepthResolver;
use crate::face_resolver::FaceResolver;
use crate::types::Violation;

/// Checks features for geometric legality before any geometry is touched.
///
/// Pure: the same feature and dimensions always produce the same list.
#[derive(Debug, Clone, Default)]
pub struct FeatureValidator {
    resolver: FaceResolver,
    rules: TransformRuleTable,
    tolerance: Tolerance,
}

impl FeatureValidator {
    pub fn new(config: &MachiningConfig) -> Self {
        Self {
            resolver: FaceResolver::new(config.face_rules.clone()),
            rules: config.transform_rules.clone(),
            tolerance: config.tolerance,
        }
    }

    /// Resolve the feature's face and validate it. Empty means valid.
    pub fn validate(&self, feature: &HoleFeature, dims: &ProfileDimensions) -> Vec<Violation> {
        let face = self
            .resolver
            .resolve(&feature.coordinate.face, dims.family())
            .face;
        self.validate_resolved(feature, face, dims)
    }

    pub fn validate_record(
        &self,
        record: &FeatureRecord,
        dims: &ProfileDimensions,
    ) -> Vec<Violation> {
        self.validate(&record.clone().into_hole(), dims)
    }

    /// Validate against an already resolved face.
    pub fn validate_resolved(
        &self,
        feature: &HoleFeature,
        face: Face,
        dims: &ProfileDimensions,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        let c = &feature.coordinate;

        if !feature.diameter.is_finite() {
            violations.push(Violation::NonFinite { field: "diameter" });
        } else if feature.diameter <= 0.0 {
            violations.push(Violation::NonPositiveDiameter {
                value: feature.diameter,
            });
        }

        let mut finite = true;
        for (field, value) in [("x", c.x), ("y", c.y), ("depth", c.depth)] {
            if !value.is_finite() {
                violations.push(Violation::NonFinite { field });
                finite = false;
            }
        }
        if c.depth.is_finite() && c.depth < 0.0 {
            violations.push(Violation::NegativeCoordinateDepth { value: c.depth });
        }

        let bounds = FaceBoundsCalculator.bounds(face, dims);
        let rule = self.rules.rule(dims.family(), face);
        // Edge-referenced values start at the bound minimum; centred
        // values sit on the bound midpoint.
        let normalise = |raw: f64, origin: AxisOrigin, min: f64, max: f64| match origin {
            AxisOrigin::Edge => raw + min,
            AxisOrigin::Centered => raw + 0.5 * (min + max),
        };
        let x = normalise(c.x, rule.x_origin, bounds.x_min, bounds.x_max);
        let y = normalise(c.y, rule.y_origin, bounds.y_min, bounds.y_max);

        let depth = if finite {
            DepthResolver.resolve_feature(feature, face, dims, rule.surface, y)
        } else {
            DepthResolver.resolve(face, dims, feature.is_through, feature.depth)
        };
        if let Err(err) = depth {
            violations.push(err.into());
        }

        if finite && !bounds.contains(x, y, self.tolerance.bounds) {
            violations.push(Violation::OutOfBounds {
                face,
                x,
                y,
                x_min: bounds.x_min,
                x_max: bounds.x_max,
                y_min: bounds.y_min,
                y_max: bounds.y_max,
            });
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_types::{MachineCoordinate, ProfileFamily};

    fn ipe() -> ProfileDimensions {
        ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)
            .unwrap()
            .with_flange_thickness(15.0)
            .unwrap()
            .with_web_thickness(8.0)
            .unwrap()
    }

    fn validator() -> FeatureValidator {
        FeatureValidator::new(&MachiningConfig::default())
    }

    #[test]
    fn valid_through_hole() {
        let hole = HoleFeature::through("B1", MachineCoordinate::new("o", 500.0, 0.0, 0.0), 20.0);
        assert!(validator().validate(&hole, &ipe()).is_empty());
    }

    #[test]
    fn blind_hole_with_zero_depth() {
        let hole =
            HoleFeature::blind("B2", MachineCoordinate::new("u", 100.0, -30.0, 0.0), 16.0, 0.0);
        let violations = validator().validate(&hole, &ipe());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("non-positive blind depth"));
    }

    #[test]
    fn collects_every_violation() {
        let c = MachineCoordinate::new("o", 1200.0, 0.0, -1.0);
        let hole = HoleFeature::through("B3", c, -5.0);
        let violations = validator().validate(&hole, &ipe());
        assert!(violations.contains(&Violation::NonPositiveDiameter { value: -5.0 }));
        assert!(violations.contains(&Violation::NegativeCoordinateDepth { value: -1.0 }));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::OutOfBounds { .. })));
    }

    #[test]
    fn non_finite_values_are_reported() {
        let c = MachineCoordinate::new("o", f64::NAN, 0.0, 0.0);
        let hole = HoleFeature::through("B4", c, f64::INFINITY);
        let violations = validator().validate(&hole, &ipe());
        assert!(violations.contains(&Violation::NonFinite { field: "diameter" }));
        assert!(violations.contains(&Violation::NonFinite { field: "x" }));
    }

    #[test]
    fn web_face_y_is_edge_referenced() {
        let v = validator();
        let ok = HoleFeature::through("W1", MachineCoordinate::new("v", 10.0, 190.0, 0.0), 12.0);
        assert!(v.validate(&ok, &ipe()).is_empty());
        let below = HoleFeature::through("W2", MachineCoordinate::new("v", 10.0, -10.0, 0.0), 12.0);
        assert_eq!(v.validate(&below, &ipe()).len(), 1);
    }

    #[test]
    fn validation_is_idempotent() {
        let v = validator();
        let c = MachineCoordinate::new("o", 2000.0, 70.0, 0.0);
        let hole = HoleFeature::blind("B5", c, 0.0, -1.0);
        assert_eq!(v.validate(&hole, &ipe()), v.validate(&hole, &ipe()));
    }

    #[test]
    fn raw_records_are_validated() {
        let record = FeatureRecord {
            id: "R1".into(),
            face: "o".into(),
            x: 10.0,
            y: 0.0,
            depth: 0.0,
            diameter: 10.0,
            is_through: false,
            blind_depth: None,
        };
        let violations = validator().validate_record(&record, &ipe());
        assert_eq!(
            violations,
            vec![Violation::NonPositiveBlindDepth { value: None }]
        );
    }

    #[test]
    fn round_tube_through_holes_must_cross_the_wall() {
        let tube = ProfileDimensions::new(ProfileFamily::TubeRound, 500.0, 100.0, 100.0)
            .unwrap()
            .with_wall_thickness(5.0)
            .unwrap();
        let v = validator();
        let at = |y| MachineCoordinate::new("o", 250.0, y, 0.0);
        let off_crown = HoleFeature::through("R1", at(40.0), 4.0);
        assert!(v.validate(&off_crown, &tube).is_empty());

        let grazing = HoleFeature::through("R2", at(44.0), 4.0);
        let violations = v.validate(&grazing, &tube);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Violation::ChordAlongWall { .. }));
    }

    #[test]
    fn plate_end_faces_use_the_plate_thickness() {
        let plate = ProfileDimensions::new(ProfileFamily::Plate, 400.0, 300.0, 30.0)
            .unwrap()
            .with_web_thickness(10.0)
            .unwrap();
        let v = validator();
        let at = |x| MachineCoordinate::new("front", x, 0.0, 0.0);
        let inside = HoleFeature::blind("E1", at(3.0), 4.0, 5.0);
        assert!(v.validate(&inside, &plate).is_empty());
        let outside = HoleFeature::blind("E2", at(12.0), 4.0, 5.0);
        assert!(matches!(
            v.validate(&outside, &plate)[..],
            [Violation::OutOfBounds { .. }]
        ));
    }
}
