// K-means over TF-IDF skill vectors.
//
// Initialization is k-means++ driven by a seeded StdRng, so the same corpus
// and seed always produce the same centroids and labels. Lloyd iterations
// then alternate assign/update until no label changes or the iteration cap
// is hit.
//
// Points are sparse (a posting lists a handful of skills out of the whole
// vocabulary); centroids are dense.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SkillmatchError};
use crate::skills::FeatureVector;

pub const DEFAULT_CLUSTERS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_ITER: usize = 300;

/// Fit-time parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansConfig {
    /// Number of clusters (k)
    pub clusters: usize,
    /// Seed for centroid initialization
    pub seed: u64,
    /// Upper bound on Lloyd iterations
    pub max_iter: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            seed: DEFAULT_SEED,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// Fitted model: one dense centroid per cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansModel {
    centroids: Vec<Vec<f64>>,
    seed: u64,
    /// Lloyd iterations actually run
    iterations: usize,
    /// Within-cluster sum of squared distances at the end of fit
    inertia: f64,
}

impl KMeansModel {
    /// Partition `points` into `config.clusters` groups.
    ///
    /// Returns the model and the label of every point, in input order. Fails
    /// before doing any work if k is zero or there are fewer distinct points
    /// than clusters.
    pub fn fit(
        config: &KMeansConfig,
        points: &[FeatureVector],
        dim: usize,
    ) -> Result<(Self, Vec<usize>)> {
        let k = config.clusters;
        if k == 0 {
            return Err(SkillmatchError::config("cluster count must be at least 1"));
        }

        let distinct: HashSet<Vec<(usize, u64)>> =
            points.iter().map(FeatureVector::identity_key).collect();
        if distinct.len() < k {
            return Err(SkillmatchError::config(format!(
                "cannot form {k} clusters from {} distinct postings",
                distinct.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut centroids = init_plus_plus(points, k, dim, &mut rng);

        let mut labels = vec![usize::MAX; points.len()];
        let mut iterations = 0;

        while iterations < config.max_iter {
            iterations += 1;

            let mut changed = 0usize;
            for (label, point) in labels.iter_mut().zip(points) {
                let nearest = nearest_centroid(&centroids, point);
                if *label != nearest {
                    *label = nearest;
                    changed += 1;
                }
            }

            debug!(iteration = iterations, changed, "k-means assignment pass");
            if changed == 0 {
                break;
            }

            centroids = update_centroids(&centroids, points, &labels, dim);
        }

        // Final labels always agree with predict() on the returned centroids.
        let labels: Vec<usize> = points
            .iter()
            .map(|p| nearest_centroid(&centroids, p))
            .collect();
        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| p.distance_squared(&centroids[l]))
            .sum();

        info!(clusters = k, iterations, inertia, "k-means fit complete");

        Ok((
            Self {
                centroids,
                seed: config.seed,
                iterations,
                inertia,
            },
            labels,
        ))
    }

    /// Id of the nearest centroid; ties go to the lowest id.
    pub fn predict(&self, point: &FeatureVector) -> usize {
        nearest_centroid(&self.centroids, point)
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }
}

/// Count how many labels fall into each of `k` clusters.
pub fn cluster_sizes(labels: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &label in labels {
        if label < k {
            sizes[label] += 1;
        }
    }
    sizes
}

fn nearest_centroid(centroids: &[Vec<f64>], point: &FeatureVector) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (id, centroid) in centroids.iter().enumerate() {
        let dist = point.distance_squared(centroid);
        if dist < best_dist {
            best = id;
            best_dist = dist;
        }
    }
    best
}

/// k-means++ seeding: first centroid uniform, each next one drawn with
/// probability proportional to its squared distance from the chosen set.
/// Points already covered (distance zero) are never drawn, so duplicates
/// cannot produce two identical centroids.
fn init_plus_plus(
    points: &[FeatureVector],
    k: usize,
    dim: usize,
    rng: &mut StdRng,
) -> Vec<Vec<f64>> {
    let first = rng.random_range(0..points.len());
    let mut centroids = vec![points[first].to_dense(dim)];
    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| p.distance_squared(&centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let target = rng.random::<f64>() * total;

        let mut chosen = None;
        let mut cumulative = 0.0;
        for (i, &d) in closest.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            cumulative += d;
            chosen = Some(i);
            if cumulative >= target {
                break;
            }
        }

        // Distinct-point check in fit() guarantees some point is uncovered.
        let Some(idx) = chosen else { break };
        let centroid = points[idx].to_dense(dim);
        for (slot, point) in closest.iter_mut().zip(points) {
            let d = point.distance_squared(&centroid);
            if d < *slot {
                *slot = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Recompute each centroid as the mean of its points. An empty cluster takes
/// over the point farthest from its current centroid.
fn update_centroids(
    previous: &[Vec<f64>],
    points: &[FeatureVector],
    labels: &[usize],
    dim: usize,
) -> Vec<Vec<f64>> {
    let k = previous.len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for &(i, w) in point.entries() {
            if i < dim {
                sums[label][i] += w;
            }
        }
    }

    let mut taken: HashSet<usize> = HashSet::new();
    let mut centroids = Vec::with_capacity(k);
    for (cluster, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
        if count > 0 {
            let n = count as f64;
            centroids.push(sum.into_iter().map(|s| s / n).collect());
            continue;
        }

        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .map(|(i, p)| (i, p.distance_squared(&previous[labels[i]])))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            });

        match farthest {
            Some((idx, _)) => {
                debug!(cluster, point = idx, "Re-seeding empty cluster");
                taken.insert(idx);
                centroids.push(points[idx].to_dense(dim));
            }
            None => centroids.push(previous[cluster].clone()),
        }
    }

    centroids
}
