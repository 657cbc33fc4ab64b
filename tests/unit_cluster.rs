// Unit tests for k-means clustering over skill vectors.
//
// Determinism under a fixed seed, configuration failures, and prediction
// behavior for vectors the model never saw.

use skillmatch::cluster::{KMeansConfig, KMeansModel};
use skillmatch::error::SkillmatchError;
use skillmatch::skills::{normalize_skills, FeatureVector, TfIdfVectorizer};

fn vectorize(raw: &[&str]) -> (TfIdfVectorizer, Vec<FeatureVector>) {
    let docs: Vec<Vec<String>> = raw.iter().map(|s| normalize_skills(s)).collect();
    TfIdfVectorizer::fit(&docs).unwrap()
}

const POSTINGS: &[&str] = &[
    "Python, SQL, Pandas",
    "Python, SQL",
    "Python, Machine Learning, TensorFlow",
    "Machine Learning, Deep Learning, PyTorch",
    "Java, Spring, Hibernate",
    "Java, Microservices, Spring",
    "AWS, Docker, Kubernetes",
    "Docker, Kubernetes, Terraform",
    "Excel, Tableau, Power BI",
    "Tableau, SQL, Excel",
];

fn config(k: usize, seed: u64) -> KMeansConfig {
    KMeansConfig {
        clusters: k,
        seed,
        ..KMeansConfig::default()
    }
}

#[test]
fn fit_is_deterministic_for_fixed_seed() {
    let (v, points) = vectorize(POSTINGS);
    let (m1, l1) = KMeansModel::fit(&config(4, 42), &points, v.dim()).unwrap();
    let (m2, l2) = KMeansModel::fit(&config(4, 42), &points, v.dim()).unwrap();
    assert_eq!(l1, l2);
    assert_eq!(m1, m2);
    assert_eq!(m1.seed(), 42);
}

#[test]
fn labels_are_in_range() {
    let (v, points) = vectorize(POSTINGS);
    let (model, labels) = KMeansModel::fit(&config(5, 42), &points, v.dim()).unwrap();
    assert_eq!(labels.len(), POSTINGS.len());
    assert!(labels.iter().all(|&l| l < model.k()));
}

#[test]
fn every_cluster_is_used_when_points_allow() {
    let (v, points) = vectorize(POSTINGS);
    let (model, labels) = KMeansModel::fit(&config(5, 7), &points, v.dim()).unwrap();
    for cluster in 0..model.k() {
        assert!(labels.contains(&cluster), "cluster {cluster} is empty");
    }
}

#[test]
fn predict_does_not_change_model() {
    let (v, points) = vectorize(POSTINGS);
    let (model, _) = KMeansModel::fit(&config(3, 42), &points, v.dim()).unwrap();
    let before = model.clone();
    for p in &points {
        model.predict(p);
    }
    model.predict(&FeatureVector::zero());
    assert_eq!(model, before);
}

#[test]
fn zero_vector_prediction_is_stable() {
    let (v, points) = vectorize(POSTINGS);
    let (model, _) = KMeansModel::fit(&config(3, 42), &points, v.dim()).unwrap();
    let oov = v.transform(&normalize_skills("COBOL, Fortran"));
    assert!(oov.is_zero());
    assert_eq!(model.predict(&oov), model.predict(&FeatureVector::zero()));
}

#[test]
fn more_clusters_than_distinct_postings_is_config_error() {
    let (v, points) = vectorize(&["Python, SQL", "python,sql", "SQL, Python"]);
    let err = KMeansModel::fit(&config(2, 42), &points, v.dim()).unwrap_err();
    assert!(matches!(err, SkillmatchError::Config(_)));
}

#[test]
fn single_cluster_holds_everything() {
    let (v, points) = vectorize(POSTINGS);
    let (model, labels) = KMeansModel::fit(&config(1, 42), &points, v.dim()).unwrap();
    assert_eq!(model.k(), 1);
    assert!(labels.iter().all(|&l| l == 0));
}

#[test]
fn iteration_cap_is_respected() {
    let (v, points) = vectorize(POSTINGS);
    let capped = KMeansConfig {
        clusters: 4,
        seed: 42,
        max_iter: 1,
    };
    let (model, labels) = KMeansModel::fit(&capped, &points, v.dim()).unwrap();
    assert_eq!(model.iterations(), 1);
    for (p, l) in points.iter().zip(&labels) {
        assert_eq!(model.predict(p), *l);
    }
}
