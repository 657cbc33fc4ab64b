// TrainedArtifact — the fitted vectorizer and cluster model, saved and loaded
// as one unit.
//
// Two JSON files sit next to each other under a shared prefix:
//   {prefix}_vectorizer.json    vocabulary + idf
//   {prefix}_kmeans_model.json  centroids + training metadata
//
// serde_json is built with `float_roundtrip`, so every f64 reads back with
// the exact bits it was written with and predictions after a reload match
// predictions before the save.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::cluster::KMeansModel;
use crate::error::{Result, SkillmatchError};
use crate::skills::{normalize_skills, FeatureVector, TfIdfVectorizer};

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Paths of the two artifact files for a given prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            vectorizer: PathBuf::from(format!("{prefix}_vectorizer.json")),
            model: PathBuf::from(format!("{prefix}_kmeans_model.json")),
        }
    }

    pub fn all_present(&self) -> bool {
        self.vectorizer.exists() && self.model.exists()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    /// Postings that went into fit (empty-skill postings excluded)
    pub training_postings: usize,
}

#[derive(Serialize, Deserialize)]
struct VectorizerFile {
    format_version: u32,
    vectorizer: TfIdfVectorizer,
}

#[derive(Serialize, Deserialize)]
struct ModelFile {
    meta: ArtifactMeta,
    model: KMeansModel,
}

/// The fitted (vectorizer, model) pair. Passed by reference through the
/// pipeline; nothing holds it globally.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedArtifact {
    pub vectorizer: TfIdfVectorizer,
    pub model: KMeansModel,
    pub meta: ArtifactMeta,
}

impl TrainedArtifact {
    pub fn new(vectorizer: TfIdfVectorizer, model: KMeansModel, training_postings: usize) -> Self {
        Self {
            vectorizer,
            model,
            meta: ArtifactMeta {
                format_version: FORMAT_VERSION,
                trained_at: Utc::now(),
                training_postings,
            },
        }
    }

    /// Vectorize a normalized skill list against the frozen vocabulary.
    pub fn vectorize(&self, skills: &[String]) -> FeatureVector {
        self.vectorizer.transform(skills)
    }

    /// Cluster id for a raw comma-separated skill string.
    pub fn predict_skills(&self, raw_skills: &str) -> usize {
        let skills = normalize_skills(raw_skills);
        self.model.predict(&self.vectorize(&skills))
    }

    pub fn save(&self, prefix: &str) -> Result<ArtifactPaths> {
        let paths = ArtifactPaths::for_prefix(prefix);

        write_json(
            &paths.vectorizer,
            &VectorizerFile {
                format_version: FORMAT_VERSION,
                vectorizer: self.vectorizer.clone(),
            },
        )?;
        write_json(
            &paths.model,
            &ModelFile {
                meta: self.meta.clone(),
                model: self.model.clone(),
            },
        )?;

        info!(
            vectorizer = %paths.vectorizer.display(),
            model = %paths.model.display(),
            "Saved trained artifact"
        );
        Ok(paths)
    }

    /// Load both files. Anything missing, undecodable, or from another format
    /// version is reported as resources unavailable; there is no fallback.
    pub fn load(prefix: &str) -> Result<Self> {
        let paths = ArtifactPaths::for_prefix(prefix);

        let vectorizer_file: VectorizerFile = read_json(&paths.vectorizer)?;
        let model_file: ModelFile = read_json(&paths.model)?;

        for (path, version) in [
            (&paths.vectorizer, vectorizer_file.format_version),
            (&paths.model, model_file.meta.format_version),
        ] {
            if version != FORMAT_VERSION {
                return Err(SkillmatchError::unavailable(
                    path,
                    format!("unsupported format version {version} (expected {FORMAT_VERSION})"),
                ));
            }
        }

        vectorizer_file
            .vectorizer
            .validate()
            .map_err(|reason| SkillmatchError::unavailable(&paths.vectorizer, reason))?;

        if model_file
            .model
            .centroids()
            .iter()
            .any(|c| c.len() != vectorizer_file.vectorizer.dim())
        {
            return Err(SkillmatchError::unavailable(
                &paths.model,
                "centroid dimension does not match vocabulary size",
            ));
        }

        Ok(Self {
            vectorizer: vectorizer_file.vectorizer,
            model: model_file.model,
            meta: model_file.meta,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| SkillmatchError::unavailable(path, e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SkillmatchError::unavailable(path, e.to_string()))
}
