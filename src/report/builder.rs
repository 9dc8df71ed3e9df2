// Incremental construction of an HtmlReport

use super::quality::{assess_quality, data_quality_score, DataQuality};
use super::{
    check_phase_order, BusinessModel, FinancialProjection, GenerationMetrics, HtmlReport,
    ImplementationDifficulty, MarketAnalysis, Money, Percentage, ReportError, ReportSection,
    SynergyScore, ValidationPhase, ValidationPlan,
};
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

/// Collects report parts and assembles them into an [`HtmlReport`].
///
/// `build` enforces the hard invariants (phase order, score ranges) and
/// computes generation metrics. Soft inconsistencies end up in
/// `metrics.dataQuality` instead of failing the build. Percentages outside
/// 0-100 are clamped and count as one of those.
pub struct ReportBuilder {
    session_id: String,
    title: String,
    executive_summary: String,
    business_model: BusinessModel,
    market_analysis: MarketAnalysis,
    financial_projections: Vec<FinancialProjection>,
    synergy_score: SynergyScore,
    implementation_difficulty: ImplementationDifficulty,
    phases: Vec<ValidationPhase>,
    total_budget: Option<Money>,
    sections: Vec<ReportSection>,
    started: Instant,
    generation_time_ms: Option<u64>,
}

impl ReportBuilder {
    pub fn new(session_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            title: title.into(),
            executive_summary: String::new(),
            business_model: BusinessModel::default(),
            market_analysis: MarketAnalysis::default(),
            financial_projections: Vec::new(),
            synergy_score: SynergyScore::default(),
            implementation_difficulty: ImplementationDifficulty::default(),
            phases: Vec::new(),
            total_budget: None,
            sections: Vec::new(),
            started: Instant::now(),
            generation_time_ms: None,
        }
    }

    pub fn executive_summary(mut self, summary: impl Into<String>) -> Self {
        self.executive_summary = summary.into();
        self
    }

    pub fn business_model(mut self, model: BusinessModel) -> Self {
        self.business_model = model;
        self
    }

    pub fn market_analysis(mut self, analysis: MarketAnalysis) -> Self {
        self.market_analysis = analysis;
        self
    }

    pub fn projection(mut self, projection: FinancialProjection) -> Self {
        self.financial_projections.push(projection);
        self
    }

    pub fn synergy(mut self, score: SynergyScore) -> Self {
        self.synergy_score = score;
        self
    }

    pub fn difficulty(mut self, difficulty: ImplementationDifficulty) -> Self {
        self.implementation_difficulty = difficulty;
        self
    }

    pub fn validation_phase(mut self, phase: ValidationPhase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Override the plan total. Defaults to the sum of phase budgets.
    pub fn total_budget(mut self, total: Money) -> Self {
        self.total_budget = Some(total);
        self
    }

    /// Append a section; ids and order follow insertion order
    pub fn section(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        let order = self.sections.len() as u32 + 1;
        self.sections.push(ReportSection {
            id: format!("section-{}", order),
            title: title.into(),
            order,
            content: content.into(),
        });
        self
    }

    /// Use a fixed generation time instead of the measured one
    pub fn with_generation_time(mut self, ms: u64) -> Self {
        self.generation_time_ms = Some(ms);
        self
    }

    pub fn build(mut self) -> Result<HtmlReport, ReportError> {
        check_phase_order(&self.phases)?;
        if !(0.0..=100.0).contains(&self.synergy_score.score) {
            return Err(ReportError::OutOfRange {
                field: "synergyScore.score".to_string(),
                value: self.synergy_score.score,
            });
        }
        if !(0.0..=100.0).contains(&self.implementation_difficulty.score) {
            return Err(ReportError::OutOfRange {
                field: "implementationDifficulty.score".to_string(),
                value: self.implementation_difficulty.score,
            });
        }

        let mut range_issues = Vec::new();
        clamp_percentage(
            "Market growth rate",
            &mut self.market_analysis.growth_rate,
            &mut range_issues,
        );
        clamp_percentage(
            "Market share",
            &mut self.market_analysis.competitive_position.market_share,
            &mut range_issues,
        );
        for projection in &mut self.financial_projections {
            clamp_percentage(
                &format!("Year {} profit margin", projection.year),
                &mut projection.profit_margin,
                &mut range_issues,
            );
        }

        let generation_time_ms = self
            .generation_time_ms
            .unwrap_or_else(|| self.started.elapsed().as_millis() as u64);
        let total_budget = self
            .total_budget
            .unwrap_or_else(|| self.phases.iter().map(|p| &p.budget).sum());
        let section_count = self.sections.len();

        let mut report = HtmlReport {
            id: Uuid::new_v4().to_string(),
            session_id: self.session_id,
            title: self.title,
            executive_summary: self.executive_summary,
            business_model: self.business_model,
            market_analysis: self.market_analysis,
            financial_projections: self.financial_projections,
            synergy_score: self.synergy_score,
            implementation_difficulty: self.implementation_difficulty,
            validation_plan: ValidationPlan {
                phases: self.phases,
                total_budget,
            },
            sections: self.sections,
            metrics: GenerationMetrics {
                completion_percentage: 0.0,
                section_count,
                generation_time_ms,
                data_quality_score: 0.0,
                data_quality: DataQuality::default(),
            },
            generated_at: Utc::now(),
        };

        let mut quality = assess_quality(&report);
        for issue in range_issues {
            quality.warn(issue);
        }
        report.metrics.completion_percentage = quality.completeness;
        report.metrics.data_quality_score = data_quality_score(&quality);
        report.metrics.data_quality = quality;

        Ok(report)
    }
}

fn clamp_percentage(label: &str, percentage: &mut Percentage, issues: &mut Vec<String>) {
    if !percentage.is_in_range() {
        let clamped = percentage.clamped();
        issues.push(format!(
            "{} {} is outside 0-100%, reported as {}",
            label, percentage, clamped
        ));
        *percentage = clamped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CompetitivePosition, DifficultyLevel, RevenueStream, SynergyGrade};

    fn phase(n: u32, budget: i64) -> ValidationPhase {
        ValidationPhase {
            phase: n,
            name: format!("Phase {}", n),
            duration_weeks: 4,
            budget: Money::yen(budget),
            activities: vec!["Interviews".to_string()],
            success_criteria: vec!["10 signups".to_string()],
        }
    }

    fn complete_builder() -> ReportBuilder {
        ReportBuilder::new("session-1", "Farm box")
            .executive_summary("Subscription boxes of local produce")
            .business_model(BusinessModel {
                overview: "Direct-to-consumer produce".to_string(),
                value_proposition: "Fresh and traceable".to_string(),
                customer_segments: vec!["Families".to_string()],
                revenue_streams: vec![RevenueStream {
                    name: "Subscriptions".to_string(),
                    description: "Monthly plan".to_string(),
                    annual_revenue: Money::yen(120_000_000),
                }],
                cost_structure: vec![],
            })
            .market_analysis(MarketAnalysis {
                tam: Money::yen(500_000_000_000),
                sam: Money::yen(20_000_000_000),
                som: Money::yen(400_000_000),
                growth_rate: Percentage::new(6.5),
                trends: vec![],
                competitive_position: CompetitivePosition::default(),
            })
            .projection(FinancialProjection::new(1, 120_000_000, 100_000_000))
            .projection(FinancialProjection::new(2, 200_000_000, 150_000_000))
            .synergy(SynergyScore::new(82.0, vec!["Logistics".to_string()], vec![]).unwrap())
            .difficulty(ImplementationDifficulty {
                level: DifficultyLevel::Medium,
                score: 55.0,
                estimated_months: 9,
                factors: vec!["Cold chain".to_string()],
            })
            .validation_phase(phase(1, 2_000_000))
            .validation_phase(phase(2, 5_000_000))
            .section("Overview", "<p>Overview</p>")
            .section("Market", "<p>Market</p>")
    }

    #[test]
    fn test_complete_report_scores_full_quality() {
        let report = complete_builder().with_generation_time(1200).build().unwrap();
        assert_eq!(report.validation_plan.total_budget, Money::yen(7_000_000));
        assert_eq!(report.synergy_score.grade, SynergyGrade::A);
        assert_eq!(report.metrics.section_count, 2);
        assert_eq!(report.metrics.generation_time_ms, 1200);
        assert_eq!(report.metrics.completion_percentage, 100.0);
        assert!(report.metrics.data_quality.consistency);
        assert_eq!(report.metrics.data_quality_score, 100.0);
        assert_eq!(report.sections[1].order, 2);
        assert_eq!(report.sections[1].id, "section-2");
    }

    #[test]
    fn test_budget_mismatch_is_a_warning() {
        let report = complete_builder()
            .total_budget(Money::yen(9_000_000))
            .build()
            .unwrap();
        let quality = &report.metrics.data_quality;
        assert!(!quality.consistency);
        assert_eq!(quality.warnings, 1);
        assert_eq!(report.metrics.data_quality_score, 80.0);
    }

    #[test]
    fn test_unnested_market_sizes_warn() {
        let report = complete_builder()
            .market_analysis(MarketAnalysis {
                tam: Money::yen(1_000),
                sam: Money::yen(5_000),
                som: Money::yen(100),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert!(report.metrics.data_quality.issues[0].contains("not nested"));
    }

    #[test]
    fn test_out_of_order_phases_fail() {
        let result = complete_builder().validation_phase(phase(2, 100)).build();
        assert!(matches!(
            result,
            Err(ReportError::PhaseOrder {
                previous: 2,
                next: 2
            })
        ));
    }

    #[test]
    fn test_empty_report_is_incomplete() {
        let report = ReportBuilder::new("s", "Empty").build().unwrap();
        assert_eq!(report.metrics.completion_percentage, 0.0);
        assert_eq!(report.metrics.data_quality_score, 0.0);
        assert!(report.metrics.data_quality.consistency);
        assert_eq!(report.validation_plan.total_budget, Money::zero());
    }

    #[test]
    fn test_loss_making_year_is_clamped_with_warning() {
        let report = complete_builder()
            .projection(FinancialProjection::new(3, 100_000_000, 125_000_000))
            .build()
            .unwrap();

        let margin = &report.financial_projections[2].profit_margin;
        assert_eq!(margin, &Percentage::new(0.0));
        assert_eq!(margin.formatted, "0.0%");

        let quality = &report.metrics.data_quality;
        assert_eq!(quality.warnings, 1);
        assert!(quality.issues[0].starts_with("Year 3 profit margin -25.0%"));
        // 100 - 15 - 5
        assert_eq!(report.metrics.data_quality_score, 80.0);
    }

    #[test]
    fn test_market_percentages_are_clamped() {
        let report = complete_builder()
            .market_analysis(MarketAnalysis {
                tam: Money::yen(500_000_000_000),
                sam: Money::yen(20_000_000_000),
                som: Money::yen(400_000_000),
                growth_rate: Percentage::new(140.0),
                trends: vec![],
                competitive_position: CompetitivePosition {
                    market_share: Percentage::new(-3.0),
                    ..Default::default()
                },
            })
            .build()
            .unwrap();

        let market = &report.market_analysis;
        assert_eq!(market.growth_rate.formatted, "100.0%");
        assert_eq!(market.competitive_position.market_share.value, 0.0);
        assert_eq!(report.metrics.data_quality.warnings, 2);
    }

    #[test]
    fn test_difficulty_out_of_range_fails() {
        let result = complete_builder()
            .difficulty(ImplementationDifficulty {
                score: 140.0,
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(ReportError::OutOfRange { .. })));
    }
}
