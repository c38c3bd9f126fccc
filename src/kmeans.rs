use crate::{histogram, swatch::Swatch, ColourVector, Error};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::index,
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// A cluster centre in RGB space. Components are means and are not truncated to integers.
pub type Centroid = (f64, f64, f64);

type Point = [f64; 3];

/// How the initial centroids are picked from the input vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Init {
    /// k-means++ seeding: every subsequent centroid is drawn with probability proportional to its squared distance
    /// from the nearest centroid already chosen.
    #[default]
    KMeansPlusPlus,
    /// K distinct input vectors drawn uniformly.
    Random,
}

/// Lloyd's algorithm over RGB colour vectors.
///
/// A run is a pure function of its input and seed; without a seed the generator is seeded from OS entropy and labels
/// are only stable within that run.
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: Option<u64>,
    init: Init,
}

/// The result of one clustering run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clustering {
    centroids: Vec<Centroid>,
    assignments: Vec<usize>,
    iterations: usize,
    converged: bool,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
            init: Init::default(),
        }
    }

    pub fn clusters(self, k: usize) -> Self {
        Self { k, ..self }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn init(self, init: Init) -> Self {
        Self { init, ..self }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Partition `vectors` into exactly `k` clusters.
    ///
    /// Fails with [`Error::EmptyInput`] when there are no vectors and with [`Error::InvalidClusterCount`] when `k` is
    /// zero or larger than the number of vectors.
    pub fn run(&self, vectors: &[ColourVector]) -> Result<Clustering, Error> {
        let n = vectors.len();

        if n == 0 {
            return Err(Error::EmptyInput);
        }

        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount { k: self.k, n });
        }

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let points = vectors.iter().copied().map(to_point).collect::<Vec<_>>();
        let mut centroids = match self.init {
            Init::KMeansPlusPlus => plus_plus_centroids(&points, self.k, &mut rng),
            Init::Random => random_centroids(&points, self.k, &mut rng),
        };

        let mut assignments = vec![0; n];
        assign(&points, &centroids, &mut assignments);

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            let Update { shift, reseeded } = update(&points, &assignments, &mut centroids, &mut rng);
            let changed = assign(&points, &centroids, &mut assignments);

            debug!(iteration = iterations, changed, shift, reseeded, "k-means iteration");

            // a reseeded centroid hasn't been refined yet, so that iteration never counts as converged
            if !reseeded && (changed == 0 || shift < self.tolerance) {
                converged = true;
                break;
            }
        }

        // the last assignment may have moved vectors after the last update; bring every populated centroid back to
        // the exact mean of its members
        let (sums, counts) = accumulate(&points, &assignments, self.k);
        for (label, centroid) in centroids.iter_mut().enumerate() {
            if counts[label] > 0 {
                *centroid = mean(sums[label], counts[label]);
            }
        }

        debug!(k = self.k, n, iterations, converged, "k-means finished");

        Ok(Clustering {
            centroids: centroids.into_iter().map(|[r, g, b]| (r, g, b)).collect(),
            assignments,
            iterations,
            converged,
        })
    }
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CLUSTER_COUNT)
    }
}

impl Clustering {
    /// The centroids, indexed by cluster label.
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// The cluster label of every input vector, in input order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the run stopped before hitting the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn populations(&self) -> Vec<usize> {
        histogram::population_counts(&self.assignments, self.k())
    }

    pub fn histogram(&self) -> Vec<f64> {
        histogram::population_histogram(&self.assignments, self.k())
    }

    /// The clusters as swatches sorted by ascending population share.
    pub fn ranked(&self) -> Vec<Swatch> {
        histogram::rank(&self.assignments, &self.centroids)
    }
}

fn to_point((r, g, b): ColourVector) -> Point {
    [r as f64, g as f64, b as f64]
}

fn distance_squared(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn mean(sum: Point, count: usize) -> Point {
    let count = count as f64;
    [sum[0] / count, sum[1] / count, sum[2] / count]
}

fn random_centroids<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    index::sample(rng, points.len(), k)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

fn plus_plus_centroids<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let n = points.len();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    // squared distance from every point to its nearest chosen centroid. chosen points sit at zero and so are never
    // drawn again
    let mut closest = points
        .iter()
        .map(|p| distance_squared(p, &points[chosen[0]]))
        .collect::<Vec<_>>();

    while chosen.len() < k {
        let next = match WeightedIndex::<f64>::new(&closest) {
            Ok(weights) => weights.sample(rng),
            Err(_) => {
                // every remaining point coincides with a chosen centroid, so fewer distinct colours than clusters
                let remaining = (0..n).filter(|i| !chosen.contains(i)).collect::<Vec<_>>();
                remaining[rng.gen_range(0..remaining.len())]
            }
        };

        for (distance, point) in closest.iter_mut().zip(points) {
            *distance = distance.min(distance_squared(point, &points[next]));
        }

        chosen.push(next);
    }

    chosen.into_iter().map(|i| points[i]).collect()
}

/// Assign every point to its nearest centroid, ties going to the lowest label. Returns how many assignments changed.
fn assign(points: &[Point], centroids: &[Point], assignments: &mut [usize]) -> usize {
    let mut changed = 0;

    for (point, label) in points.iter().zip(assignments.iter_mut()) {
        let nearest = nearest_centroid(point, centroids);

        if *label != nearest {
            *label = nearest;
            changed += 1;
        }
    }

    changed
}

fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut nearest = 0;
    let mut nearest_distance = f64::INFINITY;

    for (label, centroid) in centroids.iter().enumerate() {
        let distance = distance_squared(point, centroid);

        if distance < nearest_distance {
            nearest = label;
            nearest_distance = distance;
        }
    }

    nearest
}

fn accumulate(points: &[Point], assignments: &[usize], k: usize) -> (Vec<Point>, Vec<usize>) {
    let mut sums = vec![[0.0; 3]; k];
    let mut counts = vec![0; k];

    for (point, &label) in points.iter().zip(assignments) {
        for (sum, component) in sums[label].iter_mut().zip(point) {
            *sum += component;
        }

        counts[label] += 1;
    }

    (sums, counts)
}

/// What one update step did to the centroids.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Update {
    /// The largest distance any centroid moved.
    shift: f64,
    /// Whether an empty cluster was moved onto a colour no other centroid sits on.
    reseeded: bool,
}

/// Move every centroid to the mean of its members.
///
/// A centroid left without members jumps to the input vector farthest from its nearest populated centroid, so it never
/// lands on a colour another cluster already sits on. Only when every vector does (fewer distinct colours than
/// clusters) is a random vector used instead.
fn update<R: Rng>(points: &[Point], assignments: &[usize], centroids: &mut [Point], rng: &mut R) -> Update {
    let (sums, counts) = accumulate(points, assignments, centroids.len());
    let previous = centroids.to_vec();

    // centroids that still own members, plus every reseeded one; stale centroids of empty clusters don't count
    let mut claimed = Vec::with_capacity(centroids.len());
    for (label, centroid) in centroids.iter_mut().enumerate() {
        if counts[label] > 0 {
            *centroid = mean(sums[label], counts[label]);
            claimed.push(*centroid);
        }
    }

    let mut reseeded = false;
    for label in (0..centroids.len()).filter(|&label| counts[label] == 0) {
        centroids[label] = match farthest_point(points, &claimed) {
            Some(i) => {
                debug!(label, point = i, "reseeding empty cluster");
                reseeded = true;
                claimed.push(points[i]);
                points[i]
            }
            None => {
                debug!(label, "reseeding empty cluster at random");
                points[rng.gen_range(0..points.len())]
            }
        };
    }

    let shift = previous
        .iter()
        .zip(centroids.iter())
        .map(|(before, after)| distance_squared(before, after).sqrt())
        .fold(0.0, f64::max);

    Update { shift, reseeded }
}

/// The index of the point farthest from its nearest claimed centroid, ties going to the lowest index. `None` when every
/// point sits exactly on one.
fn farthest_point(points: &[Point], claimed: &[Point]) -> Option<usize> {
    let mut farthest = None;
    let mut farthest_distance = 0.0;

    for (i, point) in points.iter().enumerate() {
        let distance = distance_squared(point, &claimed[nearest_centroid(point, claimed)]);

        if distance > farthest_distance {
            farthest = Some(i);
            farthest_distance = distance;
        }
    }

    farthest
}
