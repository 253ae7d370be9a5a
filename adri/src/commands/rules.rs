// adri/src/commands/rules.rs
//
// USE CASE: List the rules known to the process-wide registry.

use adri_core::Dimension;
use adri_core::domain::rules::RuleRegistry;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

pub fn execute(dimension: Option<Dimension>) {
    let registry = RuleRegistry::global();
    let rules = match dimension {
        Some(d) => registry.list_by_dimension(d),
        None => registry.list(),
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule", "Dimension", "Description"]);
    for rule in &rules {
        table.add_row(vec![
            rule.id.clone(),
            rule.dimension.to_string(),
            rule.description.clone(),
        ]);
    }

    println!("{table}");
    println!("   {} rule(s)", rules.len());
}
