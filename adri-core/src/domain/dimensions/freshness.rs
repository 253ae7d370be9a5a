// adri-core/src/domain/dimensions/freshness.rs

use chrono::{DateTime, Utc};

use crate::domain::configuration::resolve_credit;
use crate::domain::dataset::Dataset;
use crate::domain::dimensions::{
    AssessmentContext, Dimension, DimensionAssessor, DimensionResult, partial_credit,
};
use crate::domain::scoring::WarningLog;

// Sub-check ceilings, summing to 20.
const HAS_TIMESTAMP_POINTS: f64 = 4.0;
const DATA_AGE_POINTS: f64 = 6.0;
const HAS_SLA_POINTS: f64 = 4.0;
const MEETS_SLA_POINTS: f64 = 4.0;
const EXPLICIT_BONUS_POINTS: f64 = 2.0;

/// Age multiple of `reasonable_age_hours` still earning half of the age points.
const STALE_AGE_FACTOR: f64 = 4.0;

const TIMESTAMP_HINTS: [&str; 6] = ["timestamp", "updated", "modified", "created", "_at", "date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evidence {
    Explicit,
    Inferred,
}

#[derive(Debug, Clone, Copy)]
struct Observation<T> {
    value: T,
    evidence: Evidence,
}

impl<T> Observation<T> {
    fn explicit(value: T) -> Self {
        Self {
            value,
            evidence: Evidence::Explicit,
        }
    }

    fn inferred(value: T) -> Self {
        Self {
            value,
            evidence: Evidence::Inferred,
        }
    }
}

/// Freshness as a sum of fixed-ceiling sub-checks. Evidence inferred from the data
/// earns `floor(ceiling * credit)`.
#[derive(Debug, Default)]
pub struct FreshnessAssessor;

impl DimensionAssessor for FreshnessAssessor {
    fn dimension(&self) -> Dimension {
        Dimension::Freshness
    }

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult {
        let mut log = WarningLog::new();
        let config = &ctx.config.freshness;
        let credit = resolve_credit(config.implicit_credit, "freshness.implicit_credit", &mut log);
        let sla_credit = resolve_credit(
            config.configured_sla_credit,
            "freshness.configured_sla_credit",
            &mut log,
        );
        let mut reasonable_age = config.reasonable_age_hours;
        if !reasonable_age.is_finite() || reasonable_age <= 0.0 {
            log.push(format!(
                "freshness.reasonable_age_hours {} is not positive; using 168",
                reasonable_age
            ));
            reasonable_age = 168.0;
        }

        let side_channel = ctx.connector.get_freshness_results();
        let explicit = side_channel
            .as_ref()
            .filter(|f| f.has_explicit_freshness_info);

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        let points = |ceiling: f64, evidence: Evidence| match evidence {
            Evidence::Explicit => ceiling,
            Evidence::Inferred => partial_credit(ceiling, credit),
        };

        // 1. Timestamp and age
        let timestamp_field = config
            .timestamp_field
            .clone()
            .or_else(|| side_channel.as_ref().and_then(|f| f.timestamp_field.clone()));
        let latest_in_data = latest_timestamp(ctx.dataset, timestamp_field.as_deref());

        let age: Option<Observation<f64>> = if let Some(explicit) = explicit
            && let Some(hours) = explicit
                .file_age_hours
                .or_else(|| explicit.last_updated.map(|t| hours_between(t, ctx.as_of)))
        {
            Some(Observation::explicit(hours))
        } else if let Some((column, latest)) = &latest_in_data {
            findings.push(format!(
                "data age inferred from latest '{}' value ({})",
                column,
                latest.to_rfc3339()
            ));
            Some(Observation::inferred(hours_between(*latest, ctx.as_of)))
        } else {
            side_channel
                .as_ref()
                .and_then(|f| {
                    f.file_age_hours
                        .or_else(|| f.last_updated.map(|t| hours_between(t, ctx.as_of)))
                })
                .map(Observation::inferred)
        };

        let has_timestamp = match age {
            Some(age) => points(HAS_TIMESTAMP_POINTS, age.evidence),
            None => {
                findings.push("no timestamp information found (missing column or metadata)".to_string());
                recommendations.push(
                    "Add a record timestamp column or report last_updated in source metadata"
                        .to_string(),
                );
                0.0
            }
        };

        let age = age.map(|mut a| {
            if !a.value.is_finite() || a.value < 0.0 {
                findings.push("latest timestamp lies in the future; age treated as 0".to_string());
                a.value = 0.0;
            }
            a
        });

        // 2. Data age reasonableness
        let data_age = match age {
            Some(age) if age.value <= reasonable_age => points(DATA_AGE_POINTS, age.evidence),
            Some(age) if age.value <= reasonable_age * STALE_AGE_FACTOR => {
                findings.push(format!(
                    "data is {:.1}h old, beyond the reasonable {:.0}h",
                    age.value, reasonable_age
                ));
                points(DATA_AGE_POINTS / 2.0, age.evidence)
            }
            Some(age) => {
                findings.push(format!("data is stale: {:.1}h old", age.value));
                0.0
            }
            None => 0.0,
        };

        // 3. SLA declared
        let sla: Option<Observation<f64>> = explicit
            .and_then(|f| f.max_age_hours)
            .map(Observation::explicit)
            .or_else(|| config.max_age_hours.map(Observation::inferred))
            .filter(|sla| {
                let usable = sla.value.is_finite() && sla.value >= 0.0;
                if !usable {
                    log.push(format!(
                        "freshness SLA max_age_hours {} is not a non-negative number; ignored",
                        sla.value
                    ));
                }
                usable
            });
        let has_sla = match sla {
            Some(Observation {
                evidence: Evidence::Explicit,
                ..
            }) => HAS_SLA_POINTS,
            Some(_) => partial_credit(HAS_SLA_POINTS, sla_credit),
            None => {
                findings.push("no freshness SLA declared".to_string());
                recommendations.push("Declare a freshness SLA (max_age_hours)".to_string());
                0.0
            }
        };

        // 4. SLA met
        let meets_sla = match (sla, age) {
            (Some(sla), Some(age)) if age.value <= sla.value => {
                let evidence = if sla.evidence == Evidence::Explicit
                    && age.evidence == Evidence::Explicit
                {
                    Evidence::Explicit
                } else {
                    Evidence::Inferred
                };
                points(MEETS_SLA_POINTS, evidence)
            }
            (Some(sla), Some(age)) => {
                findings.push(format!(
                    "data age {:.1}h exceeds the {:.1}h SLA",
                    age.value, sla.value
                ));
                0.0
            }
            _ => 0.0,
        };

        // 5. Explicit communication bonus
        let bonus = if explicit.is_some() {
            EXPLICIT_BONUS_POINTS
        } else {
            recommendations.push(
                "Supply explicit freshness metadata (last_updated, max_age_hours) to earn full credit"
                    .to_string(),
            );
            0.0
        };

        let score = has_timestamp + data_age + has_sla + meets_sla + bonus;
        tracing::debug!(has_timestamp, data_age, has_sla, meets_sla, bonus, "Freshness sub-checks");

        DimensionResult::new(Dimension::Freshness, score)
            .with_findings(findings)
            .with_recommendations(recommendations)
            .with_warnings(log.into_vec())
    }
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / 3600.0
}

/// Latest instant of the configured column, or of the first column whose name looks
/// like a timestamp and holds parseable instants.
fn latest_timestamp(
    dataset: &Dataset,
    configured: Option<&str>,
) -> Option<(String, DateTime<Utc>)> {
    let candidates: Vec<&str> = match configured {
        Some(field) => vec![field],
        None => dataset
            .column_names()
            .into_iter()
            .filter(|name| {
                let lower = name.to_lowercase();
                TIMESTAMP_HINTS.iter().any(|hint| lower.contains(hint))
            })
            .collect(),
    };

    candidates.into_iter().find_map(|name| {
        let column = dataset.column(name)?;
        column
            .non_null()
            .filter_map(|v| v.as_datetime())
            .max()
            .map(|latest| (name.to_string(), latest))
    })
}
