// adri/src/commands/assess.rs
//
// USE CASE: Assess a CSV file, print the dimension table, optionally gate on a standard.

use adri_core::domain::dimensions::MAX_DIMENSION_SCORE;
use adri_core::infrastructure::config::{
    AssessmentConfig, apply_env_overrides, find_assessment_config, load_assessment_config_file,
    load_source_metadata, load_standard, sidecar_path,
};
use adri_core::{
    Assessor, AssessmentReport, CsvConnector, Dimension, JsonReportSink, ReportSink,
    TemplateEvaluation, TemplateEvaluator,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tracing::debug;

use crate::cli::AssessArgs;

/// Returns `false` when a standard was given and is not met.
pub fn execute(args: AssessArgs) -> Result<bool> {
    // 1. Configuration
    let config = resolve_config(args.config.as_deref())?;

    // 2. Connector (+ metadata sidecar)
    let mut connector = CsvConnector::new(&args.data);
    let metadata_path = args
        .metadata
        .clone()
        .or_else(|| Some(sidecar_path(&args.data)).filter(|p| p.is_file()));
    if let Some(path) = metadata_path {
        debug!(path = ?path, "Using metadata sidecar");
        connector = connector.with_source_metadata(load_source_metadata(&path)?);
    }

    // 3. Assessor
    let standard = args.standard.as_deref().map(load_standard).transpose()?;
    let mut assessor = Assessor::new(config);
    if let Some(standard) = &standard {
        assessor = assessor.with_standard(standard.clone())?;
    }
    if let Some(as_of) = args.as_of {
        assessor = assessor.as_of(as_of);
    }

    // 4. Run
    println!("📊 Assessing '{}'...", args.data.display());
    let report = assessor.assess(&connector)?;
    print_report(&report);

    if let Some(output) = &args.output {
        JsonReportSink::new(output).write(&report)?;
        println!("📝 Report written to {}", output.display());
    }

    // 5. Gate
    let Some(standard) = standard else {
        return Ok(true);
    };
    let evaluation = TemplateEvaluator::evaluate(&report, &standard);
    print_evaluation(&evaluation);
    Ok(evaluation.compliant)
}

fn resolve_config(explicit: Option<&Path>) -> Result<AssessmentConfig> {
    if let Some(path) = explicit {
        return Ok(load_assessment_config_file(path)?);
    }
    let cwd = std::env::current_dir().into_diagnostic()?;
    match find_assessment_config(&cwd) {
        Some(path) => Ok(load_assessment_config_file(&path)?),
        None => {
            let mut config = AssessmentConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            Ok(config)
        }
    }
}

fn print_report(report: &AssessmentReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dimension", "Score", "Findings"]);

    for dimension in Dimension::ALL {
        let findings = report
            .dimension(dimension)
            .map(|d| d.findings.join("\n"))
            .unwrap_or_default();
        table.add_row(vec![
            dimension.to_string(),
            format!("{:.1} / {:.0}", report.dimension_score(dimension), MAX_DIMENSION_SCORE),
            findings,
        ]);
    }
    println!("{table}");
    println!(
        "   Overall: {:.1} / 100 ({})",
        report.overall_score(),
        report.readiness_level()
    );

    for recommendation in report.summary_recommendations() {
        println!("   💡 {}", recommendation);
    }
    for warning in report.warnings() {
        println!("   ⚠️  {}", warning);
    }
}

fn print_evaluation(evaluation: &TemplateEvaluation) {
    if evaluation.compliant {
        println!(
            "\n✨ Standard '{}' met ({:.0}% of thresholds)",
            evaluation.standard_id, evaluation.compliance_score
        );
    } else {
        println!(
            "\n❌ Standard '{}' not met ({:.0}% of thresholds)",
            evaluation.standard_id, evaluation.compliance_score
        );
        for gap in &evaluation.gaps {
            println!(
                "   ➜ {}: {:.1} < {:.1} (gap {:.1})",
                gap.requirement, gap.actual, gap.expected, gap.gap
            );
        }
    }
    for field_gap in &evaluation.field_gaps {
        println!("   ➜ field '{}': {}", field_gap.field, field_gap.reason);
    }
    if evaluation.certification_eligible {
        println!("   🏅 Eligible for certification");
    }
}
