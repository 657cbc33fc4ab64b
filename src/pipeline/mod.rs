// Pipeline coordinator — training runs and query runs.
//
// A run moves through named stages and stops at the first unrecoverable
// error. Every transition is logged with its stage so a run can be followed
// in the log without reading the code.
//
//   training:  Ingested -> Normalized -> Vectorized -> Clustered -> Persisted
//   query:     Loaded -> [Labeled] -> Vectorized -> Predicted
//
// Labeled only happens when the loaded posting table has rows without a
// cluster id; it is a transition of its own, not a hidden re-fit.

pub mod query;
pub mod train;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingested,
    Normalized,
    Vectorized,
    Clustered,
    Persisted,
    Loaded,
    Labeled,
    Predicted,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingested => "ingested",
            Stage::Normalized => "normalized",
            Stage::Vectorized => "vectorized",
            Stage::Clustered => "clustered",
            Stage::Persisted => "persisted",
            Stage::Loaded => "loaded",
            Stage::Labeled => "labeled",
            Stage::Predicted => "predicted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
