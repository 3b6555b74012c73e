//! Property-based tests over whole batches using the `proptest` crate.

use proptest::prelude::*;

use feature_engine::FeatureApplicator;
use machining_ops::MachiningConfig;
use profile_types::HoleFeature;
use test_harness::helpers::{self, through};
use test_harness::oracle::{check_batch_accounting, check_volume_equivalent};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Up to four disjoint holes on the plate, one per 100 mm slot along X.
fn arb_plate_holes() -> impl Strategy<Value = Vec<HoleFeature>> {
    prop::collection::vec((10.0f64..90.0, 20.0f64..280.0, 4.0f64..16.0), 1..=4).prop_map(
        |slots| {
            slots
                .into_iter()
                .enumerate()
                .map(|(i, (dx, y, d))| through(&format!("H{i}"), "v", 100.0 * i as f64 + dx, y, d))
                .collect()
        },
    )
}

fn applicator() -> FeatureApplicator {
    FeatureApplicator::with_default_engine(MachiningConfig::preview())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn disjoint_holes_commute(holes in arb_plate_holes()) {
        let applicator = applicator();
        let dims = helpers::plate().unwrap();
        let stock = applicator.stock(&dims).unwrap();

        let forward = applicator.apply_batch(stock.clone(), &dims, &holes);
        let reversed: Vec<_> = holes.iter().rev().cloned().collect();
        let backward = applicator.apply_batch(stock, &dims, &reversed);

        prop_assert!(forward.is_success());
        prop_assert!(backward.is_success());
        let verdict = check_volume_equivalent(&forward.mesh, &backward.mesh, 1e-5);
        prop_assert!(verdict.passed, "{}", verdict.detail);
    }

    #[test]
    fn every_feature_is_accounted_for(
        holes in arb_plate_holes(),
        bad_slot in 0usize..4,
        bad_diameter in -5.0f64..=0.0,
    ) {
        let applicator = applicator();
        let dims = helpers::plate().unwrap();
        let stock = applicator.stock(&dims).unwrap();

        let mut features = holes.clone();
        let bad = through("BAD", "v", 10.0, 150.0, bad_diameter);
        features.insert(bad_slot.min(features.len()), bad);

        let result = applicator.apply_batch(stock.clone(), &dims, &features);
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        let verdict = check_batch_accounting(&result, &ids);
        prop_assert!(verdict.passed, "{}", verdict.detail);
        prop_assert_eq!(result.failed_ids(), vec!["BAD"]);

        let valid_only = applicator.apply_batch(stock, &dims, &holes);
        prop_assert_eq!(&result.mesh.polygons, &valid_only.mesh.polygons);
    }
}
