use crate::{kmeans::Centroid, swatch::Swatch};

/// Count the members of each of the `k` clusters.
pub fn population_counts(labels: &[usize], k: usize) -> Vec<usize> {
    let mut counts = vec![0; k];

    for &label in labels {
        counts[label] += 1;
    }

    counts
}

/// The share of `labels` that falls in each of the `k` clusters. Empty clusters are kept with a share of zero.
pub fn population_histogram(labels: &[usize], k: usize) -> Vec<f64> {
    let total = labels.len() as f64;

    population_counts(labels, k)
        .into_iter()
        .map(|count| if total > 0.0 { count as f64 / total } else { 0.0 })
        .collect()
}

/// Pair every centroid with its population share and sort the pairs by ascending share. Equal shares are ordered by
/// ascending cluster label.
pub fn rank(labels: &[usize], centroids: &[Centroid]) -> Vec<Swatch> {
    let counts = population_counts(labels, centroids.len());
    let fractions = population_histogram(labels, centroids.len());

    let mut swatches = centroids
        .iter()
        .zip(counts.into_iter().zip(fractions))
        .enumerate()
        .map(|(label, (&centroid, (population, fraction)))| Swatch::new(label, centroid, population, fraction))
        .collect::<Vec<_>>();

    swatches.sort_by(|lhs, rhs| {
        lhs.fraction()
            .total_cmp(&rhs.fraction())
            .then_with(|| lhs.label().cmp(&rhs.label()))
    });

    swatches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_fractions() {
        let labels = [0, 2, 2, 1, 2, 0];

        assert_eq!(population_counts(&labels, 3), vec![2, 1, 3]);

        let histogram = population_histogram(&labels, 3);
        assert!((histogram[0] - 2.0 / 6.0).abs() < 1e-12);
        assert!((histogram[1] - 1.0 / 6.0).abs() < 1e-12);
        assert!((histogram[2] - 0.5).abs() < 1e-12);
        assert!((histogram.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_clusters_get_zero() {
        assert_eq!(population_histogram(&[1, 1], 3), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn ranks_ascending_with_label_tie_break() {
        let centroids = [(1.0, 1.0, 1.0), (2.0, 2.0, 2.0), (3.0, 3.0, 3.0), (4.0, 4.0, 4.0)];
        let labels = [3, 2, 0, 3, 0, 3];

        let ranked = rank(&labels, &centroids);
        let order = ranked.iter().map(|swatch| swatch.label()).collect::<Vec<_>>();

        // labels 1 and 2 have 0 and 1 members, labels 0 and 3 have 2 and 3
        assert_eq!(order, vec![1, 2, 0, 3]);
        assert_eq!(ranked[3].centroid(), (4.0, 4.0, 4.0));
        assert_eq!(ranked[3].population(), 3);
    }

    #[test]
    fn equal_shares_follow_labels() {
        let centroids = [(9.0, 0.0, 0.0), (0.0, 9.0, 0.0), (0.0, 0.0, 9.0)];
        let labels = [2, 1, 0];

        let order = rank(&labels, &centroids)
            .iter()
            .map(|swatch| swatch.label())
            .collect::<Vec<_>>();

        assert_eq!(order, vec![0, 1, 2]);
    }
}
