//! Accent classification against static reference profiles
//!
//! Scoring is split into one named function per feature dimension
//! ([`scoring`]) and a combination rule ([`classify`]), so each part can be
//! tested on its own.

mod classifier;
mod profile;
pub mod scoring;

pub use classifier::{classify, confidence, ClassificationResult};
pub use profile::{Accent, AccentProfile, ProfileTable};
pub use scoring::ProfileScore;
