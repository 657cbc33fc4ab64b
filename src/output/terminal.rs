// Colored terminal output for training summaries, matches and clusters.

use colored::Colorize;

use crate::pipeline::query::{ClusterSummary, QueryOutcome};
use crate::pipeline::train::TrainSummary;
use crate::postings::LabeledPosting;

/// Display what a training run did.
pub fn display_train_summary(summary: &TrainSummary) {
    let fit = &summary.fit;
    println!("\n{}", "=== Training complete ===".bold());
    println!(
        "  Pages: {} ok, {} failed",
        summary.pages_ok, summary.pages_failed
    );
    println!(
        "  Postings: {} trained, {} without skills, {} skipped",
        fit.trained,
        fit.excluded,
        summary.skipped.len()
    );
    println!(
        "  Vocabulary: {} skills  |  Iterations: {}  |  Inertia: {:.3}",
        fit.artifact.vectorizer.dim(),
        fit.artifact.model.iterations(),
        fit.artifact.model.inertia()
    );

    println!("\n  {:>7}  {:>8}", "Cluster".dimmed(), "Postings".dimmed());
    for (cluster, size) in fit.cluster_sizes.iter().enumerate() {
        println!("  {:>7}  {:>8}", cluster, size);
    }

    if !summary.skipped.is_empty() {
        println!("\n  {} skipped units:", "Warning:".yellow());
        for reason in summary.skipped.iter().take(10) {
            println!("    - {}", reason.to_string().dimmed());
        }
        if summary.skipped.len() > 10 {
            println!("    ... and {} more", summary.skipped.len() - 10);
        }
    }

    println!(
        "\n  Model: {}, {}",
        summary.artifact_paths.vectorizer.display(),
        summary.artifact_paths.model.display()
    );
    println!("  Table: {}", summary.table_path.display());
}

/// Display the answer to a skill query.
pub fn display_query(outcome: &QueryOutcome) {
    println!(
        "\n{}",
        format!("=== Skill profile -> cluster {} ===", outcome.cluster).bold()
    );
    println!("  Skills: {}", outcome.tokens.join(", ").dimmed());
    if outcome.known_tokens < outcome.tokens.len() {
        println!(
            "  {} {} of {} skills are not in the trained vocabulary",
            "Note:".yellow(),
            outcome.tokens.len() - outcome.known_tokens,
            outcome.tokens.len()
        );
    }

    if outcome.is_match() {
        println!(
            "  {}",
            format!("{} job(s) match your interests:", outcome.matches.len()).green()
        );
        display_postings(&outcome.matches);
    } else {
        println!("  No jobs match your interests right now.");
    }
}

/// Display a list of postings as a table.
pub fn display_postings(rows: &[LabeledPosting]) {
    println!();
    println!(
        "  {:<32} {:<24} {:<18} {}",
        "Title".dimmed(),
        "Company".dimmed(),
        "Location".dimmed(),
        "Skills".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for row in rows {
        let p = &row.posting;
        println!(
            "  {:<32} {:<24} {:<18} {}",
            super::truncate_chars(&p.title, 29),
            super::truncate_chars(&p.company, 21),
            super::truncate_chars(&p.location, 15),
            super::truncate_chars(&p.raw_skills, 60).dimmed(),
        );
    }
    println!();
}

/// Display cluster sizes and their most characteristic skills.
pub fn display_clusters(summaries: &[ClusterSummary]) {
    println!(
        "\n{}",
        format!("=== Skill clusters ({}) ===", summaries.len()).bold()
    );
    println!();

    for summary in summaries {
        let terms: Vec<String> = summary
            .top_terms
            .iter()
            .map(|(term, weight)| format!("{term} ({weight:.2})"))
            .collect();
        println!(
            "  {:>2}. {:>4} postings  {}",
            summary.cluster,
            summary.postings,
            if terms.is_empty() {
                "(no terms)".dimmed()
            } else {
                terms.join(", ").normal()
            }
        );
    }
    println!();
}
