// Training run: ingest -> normalize -> vectorize -> cluster -> persist.
//
// Postings with no usable skills are left out of fit() but still written to
// the posting table, labeled through the prediction path like any query.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::Stage;
use crate::artifact::{ArtifactPaths, TrainedArtifact};
use crate::cluster::{cluster_sizes, KMeansConfig, KMeansModel};
use crate::config::Config;
use crate::ingest::{self, JobSource};
use crate::postings::{table, LabeledPosting, Posting, SkipReason};
use crate::skills::{normalize_skills, NormalizedSkills, TfIdfVectorizer};

/// Result of fitting on a batch of postings, before anything touches disk.
#[derive(Debug)]
pub struct FitOutcome {
    pub artifact: TrainedArtifact,
    /// Every input posting, in input order, with its cluster id
    pub labeled: Vec<LabeledPosting>,
    /// Postings that went into fit()
    pub trained: usize,
    /// Postings left out of fit() for lack of skills
    pub excluded: usize,
    pub cluster_sizes: Vec<usize>,
}

/// What a full training run did.
#[derive(Debug)]
pub struct TrainSummary {
    pub fit: FitOutcome,
    pub skipped: Vec<SkipReason>,
    pub pages_ok: u32,
    pub pages_failed: u32,
    pub artifact_paths: ArtifactPaths,
    pub table_path: std::path::PathBuf,
}

/// Normalize, vectorize and cluster a batch of postings.
pub fn fit_postings(postings: Vec<Posting>, kmeans: &KMeansConfig) -> Result<FitOutcome> {
    let pb = ProgressBar::new(postings.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Normalizing [{bar:30}] {pos}/{len}")
            .unwrap(),
    );

    let mut normalized: Vec<NormalizedSkills> = Vec::with_capacity(postings.len());
    for posting in &postings {
        normalized.push(normalize_skills(&posting.raw_skills));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let training_idx: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, skills)| !skills.is_empty())
        .map(|(i, _)| i)
        .collect();
    let excluded = postings.len() - training_idx.len();
    info!(
        stage = %Stage::Normalized,
        postings = postings.len(),
        trainable = training_idx.len(),
        excluded,
        "Skills normalized"
    );

    let corpus: Vec<NormalizedSkills> = training_idx
        .iter()
        .map(|&i| normalized[i].clone())
        .collect();
    let (vectorizer, vectors) =
        TfIdfVectorizer::fit(&corpus).context("Failed to fit skill vectorizer")?;
    info!(
        stage = %Stage::Vectorized,
        vocabulary = vectorizer.dim(),
        "Skill vocabulary built"
    );

    let (model, fit_labels) = KMeansModel::fit(kmeans, &vectors, vectorizer.dim())
        .context("Failed to cluster postings")?;
    let sizes = cluster_sizes(&fit_labels, model.k());
    info!(stage = %Stage::Clustered, sizes = ?sizes, "Postings clustered");

    let artifact = TrainedArtifact::new(vectorizer, model, corpus.len());

    let mut labels: Vec<Option<usize>> = vec![None; postings.len()];
    for (&i, &label) in training_idx.iter().zip(&fit_labels) {
        labels[i] = Some(label);
    }
    let labeled = postings
        .into_iter()
        .zip(normalized)
        .zip(labels)
        .map(|((posting, skills), label)| {
            let cluster =
                label.unwrap_or_else(|| artifact.model.predict(&artifact.vectorize(&skills)));
            LabeledPosting {
                posting,
                cluster: Some(cluster),
            }
        })
        .collect();

    Ok(FitOutcome {
        artifact,
        labeled,
        trained: corpus.len(),
        excluded,
        cluster_sizes: sizes,
    })
}

/// Write the labeled table and the artifact under the configured prefix.
///
/// The table is staged next to its final path first, so a failed table write
/// never leaves a new model paired with labels from the previous one.
pub fn persist(fit: &FitOutcome, config: &Config) -> Result<(ArtifactPaths, std::path::PathBuf)> {
    let table_path = config.table_path();
    let staged = staging_path(&table_path);
    table::save(&staged, &fit.labeled)
        .with_context(|| format!("Failed to write posting table {}", staged.display()))?;

    let paths = match fit.artifact.save(&config.artifact_prefix) {
        Ok(paths) => paths,
        Err(e) => {
            let _ = std::fs::remove_file(&staged);
            return Err(e).context("Failed to save trained artifact");
        }
    };

    std::fs::rename(&staged, &table_path).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            staged.display(),
            table_path.display()
        )
    })?;

    info!(
        stage = %Stage::Persisted,
        table = %table_path.display(),
        rows = fit.labeled.len(),
        "Training run persisted"
    );
    Ok((paths, table_path))
}

fn staging_path(table_path: &std::path::Path) -> std::path::PathBuf {
    let mut name = table_path.as_os_str().to_owned();
    name.push(".tmp");
    std::path::PathBuf::from(name)
}

/// Full training run against a job source.
pub async fn run(source: &dyn JobSource, config: &Config) -> Result<TrainSummary> {
    config.validate()?;

    println!("Collecting postings ({} workers)...", config.workers);
    let report = ingest::collect(source, config.workers).await?;
    info!(
        stage = %Stage::Ingested,
        postings = report.postings.len(),
        skipped = report.skipped.len(),
        pages_ok = report.pages_ok,
        pages_failed = report.pages_failed,
        "Ingestion complete"
    );
    println!(
        "  {} postings ingested, {} skipped",
        report.postings.len(),
        report.skipped.len()
    );

    if report.postings.is_empty() {
        anyhow::bail!("No postings were ingested; nothing to train on");
    }

    println!("Fitting {} clusters...", config.cluster_count);
    let fit = fit_postings(report.postings, &config.kmeans())?;

    let (artifact_paths, table_path) = persist(&fit, config)?;

    Ok(TrainSummary {
        fit,
        skipped: report.skipped,
        pages_ok: report.pages_ok,
        pages_failed: report.pages_failed,
        artifact_paths,
        table_path,
    })
}
