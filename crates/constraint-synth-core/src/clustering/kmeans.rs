//! Seeded k-means with k-means++ initialization.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::error::ClusterError;

/// Outcome of a k-means run.
#[derive(Debug, Clone)]
pub struct KMeansOutcome {
    /// Cluster label for each observation (0..k).
    pub labels: Vec<usize>,
    /// Cluster centroids.
    pub centroids: Vec<Vec<f64>>,
    /// Lloyd iterations until convergence (or the cap).
    pub iterations: usize,
}

/// Run k-means over coordinate vectors.
///
/// K-means++ seeding (Arthur & Vassilvitskii, 2007) followed by Lloyd
/// iterations; an empty cluster keeps its previous centroid. Stops when
/// the largest centroid shift drops below `tolerance` or after
/// `max_iterations`.
///
/// # Errors
///
/// - `InsufficientData` when `k` exceeds the number of observations.
/// - `InvalidParameter` when `k` is zero.
pub fn kmeans(
    observations: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    tolerance: f64,
    rng: &mut ChaCha8Rng,
) -> Result<KMeansOutcome, ClusterError> {
    let n = observations.len();
    if k == 0 {
        return Err(ClusterError::invalid_parameter("k must be >= 1"));
    }
    if n < k {
        return Err(ClusterError::insufficient_data(k, n));
    }

    let d = observations[0].len();
    let mut centroids = plus_plus_init(observations, k, rng);
    let mut labels = vec![0usize; n];
    let mut iterations = 0;

    for iter in 0..max_iterations {
        iterations = iter + 1;

        // Assignment
        for (i, obs) in observations.iter().enumerate() {
            let mut min_dist = f64::INFINITY;
            let mut best = 0;
            for (c, centroid) in centroids.iter().enumerate() {
                let dist = dist_sq(obs, centroid);
                if dist < min_dist {
                    min_dist = dist;
                    best = c;
                }
            }
            labels[i] = best;
        }

        // Update
        let mut sums = vec![vec![0.0; d]; k];
        let mut counts = vec![0usize; k];
        for (i, obs) in observations.iter().enumerate() {
            counts[labels[i]] += 1;
            for (s, &v) in sums[labels[i]].iter_mut().zip(obs.iter()) {
                *s += v;
            }
        }

        let mut max_shift = 0.0f64;
        for c in 0..k {
            if counts[c] == 0 {
                continue; // empty cluster keeps its old centroid
            }
            let new: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            max_shift = max_shift.max(dist_sq(&new, &centroids[c]).sqrt());
            centroids[c] = new;
        }

        if max_shift < tolerance {
            break;
        }
    }

    Ok(KMeansOutcome {
        labels,
        centroids,
        iterations,
    })
}

/// K-means++ seeding: first centroid uniform, subsequent centroids
/// sampled proportionally to squared distance from the nearest chosen
/// centroid.
fn plus_plus_init(observations: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let n = observations.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);

    centroids.push(observations[rng.gen_range(0..n)].clone());

    let mut min_dists = vec![f64::INFINITY; n];
    for _ in 1..k {
        let last = centroids.last().expect("at least one centroid");
        for (i, obs) in observations.iter().enumerate() {
            min_dists[i] = min_dists[i].min(dist_sq(obs, last));
        }

        let total: f64 = min_dists.iter().sum();
        if total <= f64::EPSILON {
            // All points coincide with a centroid already.
            centroids.push(observations[rng.gen_range(0..n)].clone());
            continue;
        }

        let target = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = n - 1;
        for (i, &dist) in min_dists.iter().enumerate() {
            cumulative += dist;
            if cumulative >= target {
                chosen = i;
                break;
            }
        }
        centroids.push(observations[chosen].clone());
    }

    centroids
}

#[inline]
fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_two_obvious_clusters() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![0.2, 0.3],
            vec![10.0, 10.0],
            vec![10.5, 10.5],
            vec![10.2, 10.3],
        ];

        let outcome = kmeans(&data, 2, 100, 1e-6, &mut rng()).unwrap();

        assert_eq!(outcome.labels[0], outcome.labels[1]);
        assert_eq!(outcome.labels[0], outcome.labels[2]);
        assert_eq!(outcome.labels[3], outcome.labels[4]);
        assert_eq!(outcome.labels[3], outcome.labels[5]);
        assert_ne!(outcome.labels[0], outcome.labels[3]);
    }

    #[test]
    fn test_k_of_one_yields_mean_centroid() {
        let data = vec![vec![0.0], vec![2.0], vec![4.0]];
        let outcome = kmeans(&data, 1, 100, 1e-6, &mut rng()).unwrap();

        assert!(outcome.labels.iter().all(|&l| l == 0));
        assert!((outcome.centroids[0][0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_determinism_given_same_seed() {
        let data: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 7) as f64, (i % 11) as f64])
            .collect();

        let a = kmeans(&data, 3, 100, 1e-6, &mut rng()).unwrap();
        let b = kmeans(&data, 3, 100, 1e-6, &mut rng()).unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_invalid_k_rejected() {
        let data = vec![vec![0.0]];
        assert!(matches!(
            kmeans(&data, 0, 10, 1e-6, &mut rng()),
            Err(ClusterError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kmeans(&data, 2, 10, 1e-6, &mut rng()),
            Err(ClusterError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_coincident_points_terminate() {
        let data = vec![vec![1.0, 1.0]; 5];
        let outcome = kmeans(&data, 2, 100, 1e-6, &mut rng()).unwrap();
        assert_eq!(outcome.labels.len(), 5);
    }
}
