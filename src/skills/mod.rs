// Skill text processing — normalization and TF-IDF vectorization.

pub mod normalize;
pub mod tfidf;

pub use normalize::{normalize_skills, NormalizedSkills};
pub use tfidf::{FeatureVector, TfIdfVectorizer};
