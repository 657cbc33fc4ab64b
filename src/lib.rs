// skillmatch: cluster job postings by required skills and match skill profiles.
//
// This is the library root. Each module corresponds to one stage or concern
// of the clustering pipeline.

pub mod artifact;
pub mod cluster;
pub mod config;
pub mod error;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod postings;
pub mod skills;
pub mod status;
