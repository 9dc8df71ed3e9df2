// Data quality assessment for generated reports

use super::{derived_margin, HtmlReport};
use serde::{Deserialize, Serialize};

/// Penalty applied when any consistency check fails
pub const INCONSISTENCY_PENALTY: f64 = 15.0;
/// Penalty applied per warning
pub const WARNING_PENALTY: f64 = 5.0;
/// Allowed drift between a stated profit margin and the derived one
const MARGIN_TOLERANCE: f64 = 0.5;

const COMPONENT_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// Share of report components that carry content, percent
    pub completeness: f64,
    /// False when any cross-field check failed
    pub consistency: bool,
    pub warnings: u32,
    pub issues: Vec<String>,
}

impl Default for DataQuality {
    fn default() -> Self {
        Self {
            completeness: 0.0,
            consistency: true,
            warnings: 0,
            issues: Vec::new(),
        }
    }
}

impl DataQuality {
    pub(crate) fn warn(&mut self, issue: String) {
        self.consistency = false;
        self.warnings += 1;
        self.issues.push(issue);
    }
}

fn present_components(report: &HtmlReport) -> usize {
    let bm = &report.business_model;
    let ma = &report.market_analysis;
    [
        !report.executive_summary.trim().is_empty(),
        !bm.overview.trim().is_empty() && !bm.revenue_streams.is_empty(),
        ma.tam.value > 0,
        !report.financial_projections.is_empty(),
        !report.synergy_score.opportunities.is_empty() || !report.synergy_score.risks.is_empty(),
        !report.implementation_difficulty.factors.is_empty(),
        !report.validation_plan.phases.is_empty(),
        !report.sections.is_empty(),
    ]
    .iter()
    .filter(|present| **present)
    .count()
}

/// Run completeness and consistency checks over a report.
///
/// Inconsistencies never fail generation; they only show up as warnings.
pub fn assess_quality(report: &HtmlReport) -> DataQuality {
    let mut quality = DataQuality {
        completeness: (present_components(report) as f64 / COMPONENT_COUNT as f64 * 1000.0)
            .round()
            / 10.0,
        ..Default::default()
    };

    let ma = &report.market_analysis;
    if ma.som.value > ma.sam.value || ma.sam.value > ma.tam.value {
        quality.warn(format!(
            "Market sizes are not nested: TAM {} / SAM {} / SOM {}",
            ma.tam, ma.sam, ma.som
        ));
    }

    let plan = &report.validation_plan;
    let phase_total: i64 = plan.phases.iter().map(|p| p.budget.value).sum();
    if !plan.phases.is_empty() && phase_total != plan.total_budget.value {
        quality.warn(format!(
            "Validation plan total {} does not match the sum of phase budgets {}",
            plan.total_budget,
            super::format_yen(phase_total)
        ));
    }

    let mut previous_year: Option<u32> = None;
    for projection in &report.financial_projections {
        let year = projection.year;
        if projection.profit.value != projection.revenue.value - projection.costs.value {
            quality.warn(format!(
                "Year {} profit {} is not revenue minus costs",
                year, projection.profit
            ));
        }
        if projection.revenue.value > 0 {
            // Stored margins are clamped to 0-100, so compare against the clamped figure
            let derived = derived_margin(projection.revenue.value, projection.profit.value)
                .clamp(0.0, 100.0);
            if (derived - projection.profit_margin.value).abs() > MARGIN_TOLERANCE {
                quality.warn(format!(
                    "Year {} profit margin {} differs from derived {:.1}%",
                    year, projection.profit_margin, derived
                ));
            }
        }
        if let Some(prev) = previous_year {
            if year <= prev {
                quality.warn(format!("Projection year {} follows year {}", year, prev));
            }
        }
        previous_year = Some(year);
    }

    for (index, section) in report.sections.iter().enumerate() {
        if section.order as usize != index + 1 {
            quality.warn(format!(
                "Section '{}' has order {} at position {}",
                section.title,
                section.order,
                index + 1
            ));
        }
    }

    quality
}

/// Collapse a quality assessment into a single 0-100 score
pub fn data_quality_score(quality: &DataQuality) -> f64 {
    let mut score = quality.completeness;
    if !quality.consistency {
        score -= INCONSISTENCY_PENALTY;
    }
    score -= WARNING_PENALTY * quality.warnings as f64;
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_penalties() {
        let clean = DataQuality {
            completeness: 100.0,
            ..Default::default()
        };
        assert_eq!(data_quality_score(&clean), 100.0);

        let mut flawed = clean.clone();
        flawed.warn("one".to_string());
        flawed.warn("two".to_string());
        // 100 - 15 - 2 * 5
        assert_eq!(data_quality_score(&flawed), 75.0);
    }

    #[test]
    fn test_score_clamps_at_zero() {
        let mut poor = DataQuality {
            completeness: 25.0,
            ..Default::default()
        };
        for i in 0..5 {
            poor.warn(format!("issue {}", i));
        }
        assert_eq!(data_quality_score(&poor), 0.0);
    }

    #[test]
    fn test_warn_clears_consistency() {
        let mut quality = DataQuality::default();
        assert!(quality.consistency);
        quality.warn("mismatch".to_string());
        assert!(!quality.consistency);
        assert_eq!(quality.warnings, 1);
        assert_eq!(quality.issues, vec!["mismatch".to_string()]);
    }
}
