//! End-to-end pipeline scenario: a square point cloud through initial
//! solution, random-candidate optimization, and redundancy removal.

use constraint_synth_core::clustering::Cluster;
use constraint_synth_core::config::{OptimizerConfig, RedundancyConfig, SynthConfig};
use constraint_synth_core::model::Point;
use constraint_synth_core::synthesis::{synthesize, SamplingMode, Solution, UtilityMetric};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 8 points on the perimeter of a square of side 10.
fn square_points() -> Vec<Point> {
    vec![
        Point::positive(vec![0.0, 0.0]),
        Point::positive(vec![5.0, 0.0]),
        Point::positive(vec![10.0, 0.0]),
        Point::positive(vec![0.0, 5.0]),
        Point::positive(vec![10.0, 5.0]),
        Point::positive(vec![0.0, 10.0]),
        Point::positive(vec![5.0, 10.0]),
        Point::positive(vec![10.0, 10.0]),
    ]
}

#[test]
fn square_scenario_end_to_end() {
    let points = square_points();
    let cluster = Cluster::new(points.clone()).expect("square cluster must build");
    let mut solution = Solution::new(cluster).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    // The initial solution is exactly the 4-face bounding box and is
    // already feasible.
    solution.generate_initial_solution().unwrap();
    let initial = solution.constraints();
    assert_eq!(initial.len(), 4, "2 axis-aligned faces per axis");
    for constraint in &initial {
        for point in &points {
            assert!(
                constraint.is_satisfying(point),
                "box face {} must satisfy {}",
                constraint,
                point
            );
        }
    }

    // 5 random candidates through the optimizer.
    solution
        .generate_improving_constraints(
            5,
            SamplingMode::ThroughPoint,
            1.0,
            &OptimizerConfig::default(),
            &mut rng,
        )
        .unwrap();
    assert_eq!(solution.constraint_count(), 9);

    // Redundancy removal can only shrink the set and must leave every
    // original point satisfied by every retained constraint.
    solution
        .remove_redundant_constraints(
            UtilityMetric::default(),
            &RedundancyConfig::default(),
            &mut rng,
        )
        .unwrap();

    let retained = solution.constraints();
    assert!(retained.len() <= 9);
    assert!(!retained.is_empty());

    for constraint in &retained {
        for point in &points {
            assert!(
                constraint.is_satisfying(point),
                "retained constraint {} must satisfy {}",
                constraint,
                point
            );
        }
    }

    let stats = solution.stats();
    assert_eq!(stats.constraints_total, 9);
    assert_eq!(stats.constraints_retained, retained.len());
}

#[test]
fn full_pipeline_contains_all_positive_points() {
    let mut points = square_points();
    points.push(Point::negative(vec![50.0, 50.0]));

    let mut config = SynthConfig::default().with_seed(42);
    config.generator.count = 10;
    config.clustering.enforce_single_cluster = true;

    let synthesis = synthesize(&points, &config).unwrap();

    assert_eq!(synthesis.disjunct_count(), 1);
    for point in square_points() {
        assert!(
            synthesis.contains(&point),
            "positive point {} must lie in the synthesized region",
            point
        );
    }
    assert!(
        !synthesis.contains(&Point::positive(vec![50.0, 50.0])),
        "a far-away point must fall outside the bounding region"
    );
}

#[test]
fn pipeline_is_deterministic_given_seed() {
    let points = square_points();
    let mut config = SynthConfig::default().with_seed(7);
    config.generator.count = 5;

    let render = |points: &[Point], config: &SynthConfig| -> Vec<String> {
        let synthesis = synthesize(points, config).unwrap();
        synthesis
            .solutions()
            .iter()
            .flat_map(|s| s.constraints())
            .map(|c| c.to_string())
            .collect()
    };

    assert_eq!(render(&points, &config), render(&points, &config));
}
