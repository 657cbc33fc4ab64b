// Clustering — k-means over TF-IDF skill vectors.

pub mod kmeans;

pub use kmeans::{cluster_sizes, KMeansConfig, KMeansModel};
