//! Business idea validation and strengths/weaknesses analysis
//!
//! Scoring is rule based and deterministic. An idea earns up to 100 points
//! across four criteria:
//!
//! | Criterion | Max | Basis |
//! |-----------|-----|-------|
//! | clarity | 30 | description length, scaled up to 200 characters |
//! | market | 25 | specificity of the target market (word count) |
//! | revenue | 20 | revenue model names a recognised monetization pattern |
//! | economics | 25 | estimated revenue / initial investment ratio |
//!
//! An idea is considered viable at [`VIABLE_SCORE`] points or more.

use crate::models::BusinessIdea;
use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const VIABLE_SCORE: u32 = 60;

const CLARITY_MAX: f64 = 30.0;
const CLARITY_TARGET_CHARS: f64 = 200.0;
const MARKET_MAX: u32 = 25;
const REVENUE_MAX: u32 = 20;
const ECONOMICS_MAX: u32 = 25;

const KNOWN_REVENUE_MODELS: &[&str] = &[
    "subscription",
    "saas",
    "commission",
    "marketplace",
    "advertising",
    "ads",
    "licensing",
    "freemium",
    "transaction",
    "usage",
    "サブスク",
    "広告",
    "手数料",
];

/// Request body of the idea-validation endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateIdeaRequest {
    pub idea: BusinessIdea,
    #[serde(default)]
    pub analyze_strengths_and_weaknesses: Option<bool>,
}

impl ValidateIdeaRequest {
    pub fn wants_analysis(&self) -> bool {
        self.analyze_strengths_and_weaknesses.unwrap_or(false)
    }
}

impl Schema for ValidateIdeaRequest {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.nested::<BusinessIdea>("idea", true);
        v.boolean("analyzeStrengthsAndWeaknesses", false);
        v.finish()
    }
}

/// Points awarded per criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaScores {
    pub clarity: u32,
    pub market: u32,
    pub revenue: u32,
    pub economics: u32,
}

impl CriteriaScores {
    pub fn total(&self) -> u32 {
        self.clarity + self.market + self.revenue + self.economics
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaValidation {
    pub is_viable: bool,
    /// 0-100
    pub score: u32,
    pub criteria: CriteriaScores,
    /// Investment payback multiple when both figures are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_to_investment: Option<f64>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub summary: String,
}

fn clarity_points(idea: &BusinessIdea) -> u32 {
    let chars = idea.description.chars().count() as f64;
    (CLARITY_MAX * (chars / CLARITY_TARGET_CHARS).min(1.0)).round() as u32
}

fn market_points(idea: &BusinessIdea) -> u32 {
    match idea.target_market.split_whitespace().count() {
        0 | 1 => 10,
        2 => 18,
        _ => MARKET_MAX,
    }
}

fn recognised_revenue_model(idea: &BusinessIdea) -> bool {
    let model = idea.revenue_model.to_lowercase();
    KNOWN_REVENUE_MODELS.iter().any(|k| model.contains(k))
}

fn revenue_ratio(idea: &BusinessIdea) -> Option<f64> {
    match (idea.estimated_revenue, idea.initial_investment) {
        (Some(revenue), Some(investment)) if investment > 0 => {
            Some(revenue as f64 / investment as f64)
        }
        _ => None,
    }
}

fn economics_points(ratio: Option<f64>) -> u32 {
    match ratio {
        Some(r) if r >= 2.0 => ECONOMICS_MAX,
        Some(r) if r >= 1.0 => 18,
        Some(r) if r >= 0.5 => 10,
        Some(_) => 5,
        None => 8,
    }
}

/// Score an idea that already passed its schema
pub fn validate_idea(idea: &BusinessIdea) -> IdeaValidation {
    let ratio = revenue_ratio(idea);
    let criteria = CriteriaScores {
        clarity: clarity_points(idea),
        market: market_points(idea),
        revenue: if recognised_revenue_model(idea) {
            REVENUE_MAX
        } else {
            10
        },
        economics: economics_points(ratio),
    };

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if criteria.clarity < 15 {
        issues.push("Description is too brief to evaluate the concept".to_string());
        recommendations
            .push("Describe the problem, the solution and how customers are reached".to_string());
    }
    if criteria.market < MARKET_MAX {
        issues.push("Target market is broadly defined".to_string());
        recommendations.push(
            "Narrow the target market to a concrete segment (who, where, what need)".to_string(),
        );
    }
    if criteria.revenue < REVENUE_MAX {
        recommendations.push(
            "State the monetization pattern explicitly (subscription, commission, licensing, ...)"
                .to_string(),
        );
    }
    match ratio {
        None => {
            issues.push("Revenue and investment estimates are missing".to_string());
            recommendations
                .push("Add estimated annual revenue and initial investment in yen".to_string());
        }
        Some(r) if r < 1.0 => {
            issues.push(format!(
                "First-year revenue covers only {:.0}% of the initial investment",
                r * 100.0
            ));
        }
        Some(_) => {}
    }

    let score = criteria.total().min(100);
    IdeaValidation {
        is_viable: score >= VIABLE_SCORE,
        score,
        criteria,
        revenue_to_investment: ratio,
        issues,
        recommendations,
    }
}

/// Derive strengths and weaknesses from the criteria scores
pub fn analyze_strengths_and_weaknesses(
    idea: &BusinessIdea,
    validation: &IdeaValidation,
) -> IdeaAnalysis {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let c = &validation.criteria;

    if c.clarity >= 24 {
        strengths.push("Concept is clearly articulated".to_string());
    } else {
        weaknesses.push("Concept needs a more detailed description".to_string());
    }

    if c.market >= MARKET_MAX {
        strengths.push(format!("Well-defined target market: {}", idea.target_market));
    } else {
        weaknesses.push("Target market lacks specificity".to_string());
    }

    if c.revenue >= REVENUE_MAX {
        strengths.push(format!(
            "Proven monetization pattern ({})",
            idea.revenue_model
        ));
    } else {
        weaknesses.push("Monetization approach is unproven or unclear".to_string());
    }

    match validation.revenue_to_investment {
        Some(r) if r >= 2.0 => strengths.push(format!(
            "Strong unit economics: revenue is {:.1}x the initial investment",
            r
        )),
        Some(r) if r >= 1.0 => {
            strengths.push("Initial investment is recovered within the first year".to_string())
        }
        Some(_) => weaknesses.push("Long payback period on the initial investment".to_string()),
        None => weaknesses.push("Financial projections are not provided".to_string()),
    }

    let summary = if validation.is_viable {
        format!(
            "Viable idea scoring {}/100 with {} strength(s) and {} weakness(es)",
            validation.score,
            strengths.len(),
            weaknesses.len()
        )
    } else {
        format!(
            "Idea scores {}/100, below the viability threshold of {}",
            validation.score, VIABLE_SCORE
        )
    };

    IdeaAnalysis {
        strengths,
        weaknesses,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::idea::tests::sample_idea_json;
    use serde_json::json;

    fn sample_idea() -> BusinessIdea {
        BusinessIdea::parse(&sample_idea_json()).unwrap()
    }

    #[test]
    fn test_strong_idea_is_viable() {
        let validation = validate_idea(&sample_idea());
        // 98 characters of description
        assert_eq!(validation.criteria.clarity, 15);
        assert_eq!(validation.criteria.market, 25);
        assert_eq!(validation.criteria.revenue, 20);
        assert_eq!(validation.criteria.economics, 25);
        assert_eq!(validation.revenue_to_investment, Some(4.0));
        assert!(validation.is_viable);
        assert_eq!(validation.score, validation.criteria.total());
    }

    #[test]
    fn test_missing_financials_are_flagged() {
        let mut idea = sample_idea();
        idea.estimated_revenue = None;
        let validation = validate_idea(&idea);
        assert_eq!(validation.criteria.economics, 8);
        assert!(validation.revenue_to_investment.is_none());
        assert!(validation
            .issues
            .iter()
            .any(|i| i.contains("estimates are missing")));
    }

    #[test]
    fn test_weak_idea_is_not_viable() {
        let idea = BusinessIdea {
            title: "Thing".to_string(),
            description: "An app idea".to_string(),
            target_market: "Everyone".to_string(),
            revenue_model: "TBD".to_string(),
            estimated_revenue: Some(1_000_000),
            initial_investment: Some(10_000_000),
            category: None,
            tags: vec![],
        };
        let validation = validate_idea(&idea);
        assert!(!validation.is_viable);
        assert!(validation.score < VIABLE_SCORE);
        assert!(validation.issues.iter().any(|i| i.contains("10%")));
    }

    #[test]
    fn test_zero_investment_has_no_ratio() {
        let mut idea = sample_idea();
        idea.initial_investment = Some(0);
        assert!(validate_idea(&idea).revenue_to_investment.is_none());
    }

    #[test]
    fn test_analysis_reflects_criteria() {
        let idea = sample_idea();
        let validation = validate_idea(&idea);
        let analysis = analyze_strengths_and_weaknesses(&idea, &validation);
        assert!(analysis
            .strengths
            .iter()
            .any(|s| s.contains("Strong unit economics")));
        assert!(analysis
            .strengths
            .iter()
            .any(|s| s.contains("Dual-income households")));
        assert!(analysis.summary.starts_with("Viable idea"));
    }

    #[test]
    fn test_request_schema() {
        let request = ValidateIdeaRequest::parse(&json!({
            "idea": sample_idea_json(),
            "analyzeStrengthsAndWeaknesses": true
        }))
        .unwrap();
        assert!(request.wants_analysis());

        let request = ValidateIdeaRequest::parse(&json!({ "idea": sample_idea_json() })).unwrap();
        assert!(!request.wants_analysis());

        let errors = ValidateIdeaRequest::parse(&json!({
            "idea": { "title": "" },
            "analyzeStrengthsAndWeaknesses": "yes"
        }))
        .unwrap_err();
        assert!(errors.has_field("idea.title"));
        assert!(errors.has_field("idea.description"));
        assert!(errors.has_field("analyzeStrengthsAndWeaknesses"));

        let errors = ValidateIdeaRequest::parse(&json!({})).unwrap_err();
        assert!(errors.has_field("idea"));
    }
}
