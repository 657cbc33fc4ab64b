use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::artifact::ArtifactPaths;
use crate::cluster::kmeans::{DEFAULT_CLUSTERS, DEFAULT_MAX_ITER, DEFAULT_SEED};
use crate::cluster::KMeansConfig;
use crate::error::SkillmatchError;

pub const DEFAULT_PREFIX: &str = "karkidi";
pub const DEFAULT_INPUT: &str = "daily_jobs.csv";
pub const DEFAULT_WORKERS: usize = 5;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy; CLI flags override
/// whatever is set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of clusters for training (k)
    pub cluster_count: usize,
    /// Seed for centroid initialization
    pub random_seed: u64,
    /// Prefix shared by the artifact files and the labeled posting table
    pub artifact_prefix: String,
    /// Scraped postings file read by `train`
    pub input_path: PathBuf,
    pub max_iter: usize,
    /// Pages fetched concurrently during ingestion
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_count: DEFAULT_CLUSTERS,
            random_seed: DEFAULT_SEED,
            artifact_prefix: DEFAULT_PREFIX.to_string(),
            input_path: PathBuf::from(DEFAULT_INPUT),
            max_iter: DEFAULT_MAX_ITER,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables. Every option has a
    /// default; a value that is set but does not parse is an error.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            cluster_count: parse_or(&lookup, "SKILLMATCH_CLUSTERS", defaults.cluster_count)?,
            random_seed: parse_or(&lookup, "SKILLMATCH_SEED", defaults.random_seed)?,
            artifact_prefix: lookup("SKILLMATCH_PREFIX").unwrap_or(defaults.artifact_prefix),
            input_path: lookup("SKILLMATCH_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            max_iter: parse_or(&lookup, "SKILLMATCH_MAX_ITER", defaults.max_iter)?,
            workers: parse_or(&lookup, "SKILLMATCH_WORKERS", defaults.workers)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never produce a model.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_count == 0 {
            return Err(SkillmatchError::config("cluster count must be at least 1").into());
        }
        if self.workers == 0 {
            return Err(SkillmatchError::config("worker count must be at least 1").into());
        }
        if self.artifact_prefix.trim().is_empty() {
            return Err(SkillmatchError::config("artifact prefix must not be empty").into());
        }
        Ok(())
    }

    pub fn kmeans(&self) -> KMeansConfig {
        KMeansConfig {
            clusters: self.cluster_count,
            seed: self.random_seed,
            max_iter: self.max_iter,
        }
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::for_prefix(&self.artifact_prefix)
    }

    /// Where the labeled posting table lives.
    pub fn table_path(&self) -> PathBuf {
        PathBuf::from(format!("{}_jobs.csv", self.artifact_prefix))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            anyhow::Error::from(SkillmatchError::config(format!(
                "{key}={raw} is not a valid value"
            )))
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cluster_count, 5);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.artifact_prefix, "karkidi");
        assert_eq!(config.table_path(), PathBuf::from("karkidi_jobs.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SKILLMATCH_CLUSTERS", "3"),
            ("SKILLMATCH_SEED", "7"),
            ("SKILLMATCH_PREFIX", "out/jobs"),
        ]))
        .unwrap();
        assert_eq!(config.kmeans().clusters, 3);
        assert_eq!(config.kmeans().seed, 7);
        assert_eq!(
            config.artifact_paths().model,
            PathBuf::from("out/jobs_kmeans_model.json")
        );
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("SKILLMATCH_CLUSTERS", "-2")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SKILLMATCH_CLUSTERS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SKILLMATCH_SEED", "abc")])).is_err());
    }
}
