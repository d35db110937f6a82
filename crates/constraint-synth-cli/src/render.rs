//! Text rendering of the synthesized inequality system.

use constraint_synth_core::synthesis::Synthesis;

/// Render the per-cluster constraint lists plus the big-M disjunction
/// marker: each cluster's region is one branch, selected by a binary
/// indicator, and exactly one branch must hold.
pub fn render_system(synthesis: &Synthesis) -> String {
    let mut out = String::new();

    for (index, solution) in synthesis.solutions().iter().enumerate() {
        let stats = solution.stats();
        out.push_str(&format!(
            "# cluster {} ({} points, {} constraints)\n",
            index, stats.size, stats.constraints_retained
        ));

        for constraint in solution.constraints() {
            out.push_str(&format!("b{}: {}\n", index, constraint));
        }
        out.push('\n');
    }

    let indicators: Vec<String> = (0..synthesis.disjunct_count())
        .map(|i| format!("b{}", i))
        .collect();
    out.push_str(&format!("# disjunction\n{} = 1\n", indicators.join(" + ")));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use constraint_synth_core::config::SynthConfig;
    use constraint_synth_core::model::Point;
    use constraint_synth_core::synthesis::synthesize;

    #[test]
    fn test_render_lists_clusters_and_marker() {
        let points = vec![
            Point::positive(vec![0.0, 0.0]),
            Point::positive(vec![1.0, 0.0]),
            Point::positive(vec![0.0, 1.0]),
            Point::positive(vec![1.0, 1.0]),
        ];
        let mut config = SynthConfig::default();
        config.generator.count = 3;

        let synthesis = synthesize(&points, &config).unwrap();
        let rendered = render_system(&synthesis);

        assert!(rendered.contains("# cluster 0"));
        assert!(rendered.contains("b0:"));
        assert!(rendered.contains("b0 = 1"), "single-cluster disjunction");
        assert!(rendered.contains("<=") || rendered.contains(">="));
    }
}
