// adri-core/src/domain/scoring/mod.rs

pub mod counts;
pub mod engine;
pub mod explain;
pub mod weights;

pub use counts::{CategoryCount, RuleCountTable};
pub use engine::{EngineOutcome, score_categories};
pub use explain::{AppliedWeights, ExplainPayload};
pub use weights::{
    AdditiveContribution, EQUALIZED_WEIGHT, WarningLog, WeightedComponent, WeightedScore, combine,
    resolve_weights,
};
