// Query run: match a user's skill profile against the labeled postings.
//
// Nothing here retrains. A missing or corrupt artifact is fatal and reported
// as resources unavailable; an empty match set is a normal answer.

use anyhow::{Context, Result};
use tracing::info;

use super::Stage;
use crate::artifact::TrainedArtifact;
use crate::config::Config;
use crate::error::SkillmatchError;
use crate::postings::{table, LabeledPosting};
use crate::skills::{normalize_skills, NormalizedSkills};

/// Answer to a skill query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Cluster predicted for the query
    pub cluster: usize,
    /// Normalized query tokens
    pub tokens: NormalizedSkills,
    /// How many query tokens the trained vocabulary knows
    pub known_tokens: usize,
    /// Rows labeled with `cluster`, in table order
    pub matches: Vec<LabeledPosting>,
}

impl QueryOutcome {
    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Per-cluster overview for `describe`.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub postings: usize,
    pub top_terms: Vec<(String, f64)>,
}

/// Labeled transition: predict a cluster for every row that lacks one.
/// Returns how many rows were labeled.
pub fn label_missing(artifact: &TrainedArtifact, rows: &mut [LabeledPosting]) -> usize {
    let mut labeled = 0;
    for row in rows.iter_mut().filter(|r| r.cluster.is_none()) {
        row.cluster = Some(artifact.predict_skills(&row.posting.raw_skills));
        labeled += 1;
    }
    if labeled > 0 {
        info!(stage = %Stage::Labeled, rows = labeled, "Labeled unlabeled postings");
    }
    labeled
}

/// Predict the cluster for a comma-separated skill string and collect the
/// rows that share it. Rows without a label never match; run
/// `label_missing` first.
pub fn run(artifact: &TrainedArtifact, rows: &[LabeledPosting], skills: &str) -> QueryOutcome {
    let tokens = normalize_skills(skills);
    let known_tokens = tokens
        .iter()
        .filter(|t| artifact.vectorizer.index_of(t).is_some())
        .count();

    let vector = artifact.vectorize(&tokens);
    info!(
        stage = %Stage::Vectorized,
        tokens = tokens.len(),
        known_tokens,
        "Query vectorized"
    );

    let cluster = artifact.model.predict(&vector);
    let matches: Vec<LabeledPosting> = rows
        .iter()
        .filter(|r| r.cluster == Some(cluster))
        .cloned()
        .collect();
    info!(
        stage = %Stage::Predicted,
        cluster,
        matches = matches.len(),
        "Query matched"
    );

    QueryOutcome {
        cluster,
        tokens,
        known_tokens,
        matches,
    }
}

/// Rows labeled with an explicit cluster id.
pub fn browse(
    artifact: &TrainedArtifact,
    rows: &[LabeledPosting],
    cluster: usize,
) -> Result<Vec<LabeledPosting>> {
    let k = artifact.model.k();
    if cluster >= k {
        return Err(SkillmatchError::config(format!(
            "cluster {cluster} does not exist (model has clusters 0..{k})"
        ))
        .into());
    }
    Ok(rows
        .iter()
        .filter(|r| r.cluster == Some(cluster))
        .cloned()
        .collect())
}

/// Size and top centroid terms of every cluster.
pub fn describe(
    artifact: &TrainedArtifact,
    rows: &[LabeledPosting],
    top_n: usize,
) -> Vec<ClusterSummary> {
    artifact
        .model
        .centroids()
        .iter()
        .enumerate()
        .map(|(cluster, centroid)| ClusterSummary {
            cluster,
            postings: rows.iter().filter(|r| r.cluster == Some(cluster)).count(),
            top_terms: artifact.vectorizer.top_terms(centroid, top_n),
        })
        .collect()
}

/// Load the artifact and posting table for `config`, labeling (and
/// rewriting) the table if any row lacks a cluster id.
///
/// Rows that `table::load` skips for a missing required field are not part of
/// the result, so a rewrite drops them from the file. Each one is logged with
/// `warn!` as it is skipped.
pub fn load_labeled(config: &Config) -> Result<(TrainedArtifact, Vec<LabeledPosting>)> {
    let artifact =
        TrainedArtifact::load(&config.artifact_prefix).context("Cannot load trained model")?;

    let table_path = config.table_path();
    let mut rows = table::load(&table_path).context("Cannot load posting table")?;
    info!(
        stage = %Stage::Loaded,
        rows = rows.len(),
        clusters = artifact.model.k(),
        "Artifact and table loaded"
    );

    if label_missing(&artifact, &mut rows) > 0 {
        table::save(&table_path, &rows)
            .with_context(|| format!("Failed to rewrite {}", table_path.display()))?;
    }

    Ok((artifact, rows))
}

/// Full query run from disk.
pub fn execute(config: &Config, skills: &str) -> Result<QueryOutcome> {
    let (artifact, rows) = load_labeled(config)?;
    Ok(run(&artifact, &rows, skills))
}

/// True when the error chain bottoms out in missing or corrupt resources.
pub fn is_resources_unavailable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<SkillmatchError>()
            .is_some_and(SkillmatchError::is_unavailable)
    })
}
