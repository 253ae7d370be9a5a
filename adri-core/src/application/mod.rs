// adri-core/src/application/mod.rs

pub mod assessor;
pub mod guard;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI and embedding code only need `use adri_core::application::{Assessor, DataGuard};`

pub use assessor::Assessor;
pub use guard::{DataGuard, GuardDecision, GuardVerdict, OnFailure};
