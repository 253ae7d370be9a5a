// adri/src/commands/mod.rs

pub mod assess;
pub mod rules;
pub mod validate;
