use approx::assert_relative_eq;
use feature_engine::{BatchState, FeatureApplicator};
use machining_ops::MachiningConfig;
use mesh_kernel::faceted_cylinder_volume;
use profile_types::{
    Face, FailureKind, FeatureRecord, HoleFeature, MachineCoordinate, ProfileDimensions,
    ProfileFamily,
};

const SEGMENTS: usize = 32;

fn plate() -> ProfileDimensions {
    ProfileDimensions::new(ProfileFamily::Plate, 400.0, 300.0, 10.0)
        .unwrap()
        .with_web_thickness(10.0)
        .unwrap()
}

fn ipe() -> ProfileDimensions {
    ProfileDimensions::new(ProfileFamily::IProfile, 1000.0, 200.0, 100.0)
        .unwrap()
        .with_flange_thickness(15.0)
        .unwrap()
        .with_web_thickness(8.0)
        .unwrap()
}

fn applicator() -> FeatureApplicator {
    FeatureApplicator::default()
}

#[test]
fn plate_through_hole_removes_tool_area_times_thickness() {
    let applicator = applicator();
    let dims = plate();
    let stock = applicator.stock(&dims).unwrap();
    let hole = HoleFeature::through("P1", MachineCoordinate::new("v", 200.0, 150.0, 0.0), 20.0);

    let result = applicator.apply_batch(stock.clone(), &dims, &[hole]);
    assert!(result.is_success(), "{:?}", result.errors);

    let removed = stock.volume() - result.mesh.volume();
    assert_relative_eq!(removed, faceted_cylinder_volume(10.0, 10.0, SEGMENTS), epsilon = 1e-6);
    assert!(result.mesh.validate().is_empty());
    assert_eq!(result.applied[0].face, Face::Left);
    assert_relative_eq!(result.applied[0].depth, 20.0);
}

#[test]
fn plate_blind_hole_from_the_underside() {
    let applicator = applicator();
    let dims = plate();
    let stock = applicator.stock(&dims).unwrap();
    let hole = HoleFeature::blind("P2", MachineCoordinate::new("h", 100.0, 100.0, 0.0), 12.0, 4.0);

    let result = applicator.apply_batch(stock.clone(), &dims, &[hole]);
    assert!(result.is_success(), "{:?}", result.errors);
    let removed = stock.volume() - result.mesh.volume();
    assert_relative_eq!(removed, faceted_cylinder_volume(6.0, 4.0, SEGMENTS), epsilon = 1e-6);
    assert_relative_eq!(result.applied[0].position[1], -5.0, epsilon = 1e-9);
}

#[test]
fn i_profile_top_flange_hole() {
    let applicator = applicator();
    let dims = ipe();
    let stock = applicator.stock(&dims).unwrap();
    let hole = HoleFeature::through("B1", MachineCoordinate::new("o", 500.0, 0.0, 0.0), 20.0);

    let result = applicator.apply_batch(stock.clone(), &dims, &[hole]);
    assert_eq!(result.state, BatchState::Done);

    let applied = &result.applied[0];
    assert_eq!(applied.face, Face::Top);
    assert_relative_eq!(applied.depth, 30.0);
    assert_relative_eq!(applied.position[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(applied.position[1], 100.0, epsilon = 1e-9);
    assert_relative_eq!(applied.position[2], 0.0, epsilon = 1e-9);

    // The over-long tool also reaches into the web below the flange.
    let removed = stock.volume() - result.mesh.volume();
    assert!(removed >= faceted_cylinder_volume(10.0, 15.0, SEGMENTS) - 1e-6);
}

#[test]
fn i_profile_web_hole_is_rotated() {
    let applicator = applicator();
    let dims = ipe();
    let stock = applicator.stock(&dims).unwrap();
    let hole = HoleFeature::through("W1", MachineCoordinate::new("v", 300.0, 100.0, 0.0), 18.0);

    let result = applicator.apply_batch(stock.clone(), &dims, &[hole]);
    assert!(result.is_success(), "{:?}", result.errors);
    let removed = stock.volume() - result.mesh.volume();
    assert_relative_eq!(removed, faceted_cylinder_volume(9.0, 8.0, SEGMENTS), epsilon = 1e-6);
    assert_relative_eq!(result.applied[0].position[0], -200.0, epsilon = 1e-9);
    assert_relative_eq!(result.applied[0].position[2], -4.0, epsilon = 1e-9);
}

#[test]
fn successive_holes_accumulate() {
    let applicator = applicator();
    let dims = plate();
    let stock = applicator.stock(&dims).unwrap();
    let holes: Vec<HoleFeature> = [50.0, 150.0, 250.0]
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            HoleFeature::through(format!("H{i}"), MachineCoordinate::new("v", x, 150.0, 0.0), 10.0)
        })
        .collect();

    let result = applicator.apply_batch(stock.clone(), &dims, &holes);
    assert_eq!(result.applied_count, 3);
    let removed = stock.volume() - result.mesh.volume();
    assert_relative_eq!(
        removed,
        3.0 * faceted_cylinder_volume(5.0, 10.0, SEGMENTS),
        epsilon = 1e-6
    );
    let ids: Vec<_> = result
        .mesh
        .metadata
        .applied_features
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, vec!["H0", "H1", "H2"]);
}

#[test]
fn hole_outside_the_face_is_rejected() {
    let applicator = applicator();
    let dims = plate();
    let stock = applicator.stock(&dims).unwrap();
    let hole = HoleFeature::through("X1", MachineCoordinate::new("v", 450.0, 150.0, 0.0), 10.0);

    let result = applicator.apply_batch(stock.clone(), &dims, &[hole]);
    assert_eq!(result.state, BatchState::PartialFailure);
    assert_eq!(result.errors[0].kind, FailureKind::Validation);
    assert!(result.errors[0].reasons[0].contains("outside"));
    assert_eq!(result.mesh.polygons, stock.polygons);
}

#[test]
fn parser_records_are_accepted() {
    let json = r#"[
        {"id":"R1","face":"v","x":100,"y":150,"diameter":10,"isThrough":true},
        {"id":"R2","face":"v","x":300,"y":150,"diameter":10,"isThrough":false}
    ]"#;
    let records: Vec<FeatureRecord> = serde_json::from_str(json).unwrap();
    let applicator = FeatureApplicator::with_default_engine(MachiningConfig::preview());
    let dims = plate();
    let stock = applicator.stock(&dims).unwrap();

    let result = applicator.apply_records(stock, &dims, &records);
    assert_eq!(result.applied_count, 1);
    assert_eq!(result.failed_ids(), vec!["R2"]);

    let report = result.report().to_json().unwrap();
    assert!(report.contains("\"appliedCount\": 1"));
}
