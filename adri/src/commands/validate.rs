// adri/src/commands/validate.rs
//
// USE CASE: Validate a standard document without assessing anything.

use adri_core::infrastructure::config::load_standard;
use miette::Result;
use std::path::Path;

pub fn execute(path: &Path) -> Result<()> {
    let standard = load_standard(path)?;
    let requirements = &standard.requirements;

    println!("✅ Standard '{}' is valid", standard.id());
    println!(
        "   v{} | {} field requirement(s) | {} dimension threshold(s)",
        standard.template.version,
        requirements.field_requirements.len(),
        requirements.dimension_requirements.len()
    );
    if let Some(minimum) = requirements.overall_minimum {
        println!("   Overall minimum: {:.1}", minimum);
    }
    if !requirements.primary_key_fields.is_empty() {
        println!("   Primary key: {}", requirements.primary_key_fields.join(", "));
    }
    Ok(())
}
