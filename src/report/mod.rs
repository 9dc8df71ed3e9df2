//! Business report produced at the end of an ideation session
//!
//! `HtmlReport` is the artifact dashboards and exports consume, so its field
//! names and nesting are part of the external contract. Every monetary
//! figure is a [`Money`] pair and every percentage is on a 0-100 scale.

pub mod builder;
pub mod currency;
pub mod quality;
pub mod render;
pub mod synergy;

pub use builder::ReportBuilder;
pub use currency::{format_percentage, format_yen, parse_yen, Money, Percentage};
pub use quality::{assess_quality, data_quality_score, DataQuality};
pub use render::ReportRenderer;
pub use synergy::{SynergyGrade, SynergyScore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Validation plan phases must strictly increase: phase {next} follows phase {previous}")]
    PhaseOrder { previous: u32, next: u32 },

    #[error("{field} must be between 0 and 100 (got {value})")]
    OutOfRange { field: String, value: f64 },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlReport {
    pub id: String,
    pub session_id: String,
    pub title: String,
    pub executive_summary: String,
    pub business_model: BusinessModel,
    pub market_analysis: MarketAnalysis,
    pub financial_projections: Vec<FinancialProjection>,
    pub synergy_score: SynergyScore,
    pub implementation_difficulty: ImplementationDifficulty,
    pub validation_plan: ValidationPlan,
    pub sections: Vec<ReportSection>,
    pub metrics: GenerationMetrics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessModel {
    pub overview: String,
    pub value_proposition: String,
    pub customer_segments: Vec<String>,
    pub revenue_streams: Vec<RevenueStream>,
    pub cost_structure: Vec<CostItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStream {
    pub name: String,
    pub description: String,
    pub annual_revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    pub name: String,
    pub amount: Money,
    pub recurring: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// Total addressable market
    pub tam: Money,
    /// Serviceable addressable market
    pub sam: Money,
    /// Serviceable obtainable market
    pub som: Money,
    /// Annual growth rate
    pub growth_rate: Percentage,
    pub trends: Vec<String>,
    pub competitive_position: CompetitivePosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitivePosition {
    /// Expected share of the SAM
    pub market_share: Percentage,
    pub competitors: Vec<String>,
    pub differentiators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProjection {
    pub year: u32,
    pub revenue: Money,
    pub costs: Money,
    pub profit: Money,
    /// Profit over revenue
    pub profit_margin: Percentage,
}

impl FinancialProjection {
    /// Derive profit and margin from revenue and costs.
    ///
    /// A loss gives a negative margin here; `ReportBuilder::build` clamps it
    /// to 0 and records a data-quality warning.
    pub fn new(year: u32, revenue: i64, costs: i64) -> Self {
        let profit = revenue - costs;
        Self {
            year,
            revenue: Money::yen(revenue),
            costs: Money::yen(costs),
            profit: Money::yen(profit),
            profit_margin: Percentage::new(derived_margin(revenue, profit)),
        }
    }
}

/// Profit over revenue in percent, 0 when there is no revenue
pub fn derived_margin(revenue: i64, profit: i64) -> f64 {
    if revenue > 0 {
        profit as f64 / revenue as f64 * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DifficultyLevel {
    /// Thresholds: below 40 is low, 70 and above is high
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            DifficultyLevel::High
        } else if score >= 40.0 {
            DifficultyLevel::Medium
        } else {
            DifficultyLevel::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationDifficulty {
    pub level: DifficultyLevel,
    /// 0-100, higher is harder
    pub score: f64,
    pub estimated_months: u32,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPlan {
    pub phases: Vec<ValidationPhase>,
    pub total_budget: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPhase {
    pub phase: u32,
    pub name: String,
    pub duration_weeks: u32,
    pub budget: Money,
    pub activities: Vec<String>,
    pub success_criteria: Vec<String>,
}

/// Check that phase numbers strictly increase
pub fn check_phase_order(phases: &[ValidationPhase]) -> Result<(), ReportError> {
    for pair in phases.windows(2) {
        if pair[1].phase <= pair[0].phase {
            return Err(ReportError::PhaseOrder {
                previous: pair[0].phase,
                next: pair[1].phase,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub id: String,
    pub title: String,
    /// Position in the rendered document, starting at 1
    pub order: u32,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub completion_percentage: f64,
    pub section_count: usize,
    pub generation_time_ms: u64,
    pub data_quality_score: f64,
    pub data_quality: DataQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(n: u32) -> ValidationPhase {
        ValidationPhase {
            phase: n,
            name: format!("Phase {}", n),
            duration_weeks: 4,
            budget: Money::yen(1_000_000),
            activities: vec![],
            success_criteria: vec![],
        }
    }

    #[test]
    fn test_phase_order() {
        assert!(check_phase_order(&[]).is_ok());
        assert!(check_phase_order(&[phase(1), phase(2), phase(5)]).is_ok());
        assert!(matches!(
            check_phase_order(&[phase(1), phase(3), phase(3)]),
            Err(ReportError::PhaseOrder {
                previous: 3,
                next: 3
            })
        ));
        assert!(check_phase_order(&[phase(2), phase(1)]).is_err());
    }

    #[test]
    fn test_financial_projection_derives_profit() {
        let p = FinancialProjection::new(1, 50_000_000, 40_000_000);
        assert_eq!(p.profit, Money::yen(10_000_000));
        assert_eq!(p.profit_margin.formatted, "20.0%");

        let no_revenue = FinancialProjection::new(1, 0, 5_000_000);
        assert_eq!(no_revenue.profit.formatted, "-¥5,000,000");
        assert_eq!(no_revenue.profit_margin.value, 0.0);

        let loss = FinancialProjection::new(1, 10_000_000, 12_500_000);
        assert_eq!(loss.profit_margin.value, -25.0);
    }

    #[test]
    fn test_difficulty_level_thresholds() {
        assert_eq!(DifficultyLevel::from_score(10.0), DifficultyLevel::Low);
        assert_eq!(DifficultyLevel::from_score(40.0), DifficultyLevel::Medium);
        assert_eq!(DifficultyLevel::from_score(70.0), DifficultyLevel::High);
    }
}
