use colour_checker::{rank, Error, Init, KMeans, Palette};

fn noisy_image(n: usize) -> Vec<(u8, u8, u8)> {
    // three loose blobs of colour, weighted 3:2:1
    (0..n)
        .map(|i| {
            let jitter = (i * 7 % 11) as u8;
            match i % 6 {
                0..=2 => (200 + jitter, 30 + jitter, 30),
                3 | 4 => (20, 150 + jitter, 40 + jitter),
                _ => (jitter, jitter, 220 + jitter),
            }
        })
        .collect()
}

#[test]
fn black_and_white_example() {
    let vectors = [(0, 0, 0), (0, 0, 0), (255, 255, 255)];
    let clustering = KMeans::new(2).seed(2023).run(&vectors).unwrap();
    let ranked = clustering.ranked();

    assert_eq!(ranked.len(), 2);

    assert_eq!(ranked[0].centroid(), (255.0, 255.0, 255.0));
    assert!((ranked[0].fraction() - 1.0 / 3.0).abs() < 1e-9);

    assert_eq!(ranked[1].centroid(), (0.0, 0.0, 0.0));
    assert!((ranked[1].fraction() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn error_cases() {
    let vectors = [(1, 2, 3); 4];

    assert_eq!(KMeans::new(3).run(&[]), Err(Error::EmptyInput));
    assert_eq!(
        KMeans::new(0).run(&vectors),
        Err(Error::InvalidClusterCount { k: 0, n: 4 })
    );
    assert_eq!(
        KMeans::new(5).run(&vectors),
        Err(Error::InvalidClusterCount { k: 5, n: 4 })
    );
}

#[test]
fn histogram_sums_to_one() {
    let vectors = noisy_image(601);

    for k in 1..=8 {
        let clustering = KMeans::new(k).seed(k as u64).run(&vectors).unwrap();
        let total: f64 = clustering.histogram().iter().sum();

        assert!((total - 1.0).abs() < 1e-9, "k = {} sums to {}", k, total);
        assert!(clustering.histogram().iter().all(|&fraction| fraction >= 0.0));
    }
}

#[test]
fn ranking_is_a_total_order() {
    let vectors = noisy_image(300);
    let ranked = KMeans::new(6).seed(17).run(&vectors).unwrap().ranked();

    for pair in ranked.windows(2) {
        let (lhs, rhs) = (pair[0], pair[1]);

        assert!(lhs.fraction() <= rhs.fraction());
        if lhs.fraction() == rhs.fraction() {
            assert!(lhs.label() < rhs.label());
        }
    }
}

#[test]
fn rank_breaks_ties_by_label() {
    let centroids = [(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (2.0, 2.0, 2.0), (3.0, 3.0, 3.0)];
    let labels = [3, 3, 1, 2, 0, 0];

    let order = rank(&labels, &centroids)
        .iter()
        .map(|swatch| swatch.label())
        .collect::<Vec<_>>();

    assert_eq!(order, vec![1, 2, 0, 3]);
}

#[test]
fn seeded_runs_repeat() {
    let vectors = noisy_image(1000);

    for init in [Init::KMeansPlusPlus, Init::Random] {
        let kmeans = KMeans::new(4).init(init).seed(99);
        let first = kmeans.run(&vectors).unwrap();
        let second = kmeans.run(&vectors).unwrap();

        assert_eq!(first.assignments(), second.assignments());
        assert_eq!(first.centroids(), second.centroids());
    }
}

#[test]
fn as_many_clusters_as_vectors() {
    let vectors = (0..20u8).map(|i| (i * 12, 255 - i * 12, i)).collect::<Vec<_>>();
    let clustering = KMeans::new(vectors.len()).seed(8).run(&vectors).unwrap();

    for (i, swatch) in clustering.ranked().iter().enumerate() {
        assert!((swatch.fraction() - 1.0 / 20.0).abs() < 1e-12, "entry {}", i);
        assert_eq!(swatch.population(), 1);
    }

    for (vector, &label) in vectors.iter().zip(clustering.assignments()) {
        let (r, g, b) = *vector;
        assert_eq!(clustering.centroids()[label], (r as f64, g as f64, b as f64));
    }
}

#[test]
fn one_cluster_is_the_mean() {
    let vectors = noisy_image(120);
    let clustering = KMeans::new(1).seed(0).run(&vectors).unwrap();

    let n = vectors.len() as f64;
    let (r, g, b) = vectors.iter().fold((0.0, 0.0, 0.0), |(r, g, b), &(vr, vg, vb)| {
        (r + vr as f64, g + vg as f64, b + vb as f64)
    });
    let (cr, cg, cb) = clustering.centroids()[0];

    assert!((cr - r / n).abs() < 1e-9);
    assert!((cg - g / n).abs() < 1e-9);
    assert!((cb - b / n).abs() < 1e-9);
    assert_eq!(clustering.histogram(), vec![1.0]);
}

#[test]
fn palette_finds_the_blobs() {
    let palette = Palette::from_vectors(noisy_image(600))
        .clusters(3)
        .seed(12)
        .generate()
        .unwrap();

    let shares = palette
        .swatches()
        .iter()
        .map(|swatch| (swatch.fraction() * 6.0).round() as u32)
        .collect::<Vec<_>>();

    assert_eq!(shares, vec![1, 2, 3]);

    let (r, g, b) = palette.most_prominent_color().unwrap();
    assert!(r > 190 && g < 50 && b < 50);
}
