// Stub agents for the five pipeline roles
//
// Each agent reads and extends the shared `PipelineContext` and reports a
// one-line message. Output comes from fixtures, not from a model.

use super::fixtures;
use super::{PipelineContext, PipelineError};
use crate::ideas::{analyze_strengths_and_weaknesses, validate_idea};
use crate::models::{
    AgentRole, BusinessIdea, SearchType, SessionStatus, WebSearchQuery, WebSearchResult,
};
use crate::report::{
    BusinessModel, CompetitivePosition, CostItem, DifficultyLevel, FinancialProjection,
    ImplementationDifficulty, MarketAnalysis, Money, Percentage, ReportBuilder, RevenueStream,
    SynergyScore, ValidationPhase,
};
use crate::validation::Schema;
use serde_json::{json, Value};

/// What an agent step produced
#[derive(Debug, Clone, Default)]
pub struct AgentOutput {
    pub message: String,
    pub data: Option<Value>,
    /// Ideas to announce with `idea_generated` events
    pub ideas: Vec<BusinessIdea>,
}

impl AgentOutput {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// One step of the ideation pipeline
pub trait StubAgent: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Session status while this agent runs
    fn phase(&self) -> SessionStatus;

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError>;
}

/// The default agent line-up in execution order
pub fn default_agents() -> Vec<Box<dyn StubAgent>> {
    AgentRole::all().iter().map(|role| agent_for(*role)).collect()
}

pub fn agent_for(role: AgentRole) -> Box<dyn StubAgent> {
    match role {
        AgentRole::Researcher => Box::new(ResearcherAgent),
        AgentRole::Ideator => Box::new(IdeatorAgent),
        AgentRole::Critic => Box::new(CriticAgent),
        AgentRole::Analyst => Box::new(AnalystAgent),
        AgentRole::Writer => Box::new(WriterAgent),
    }
}

pub struct ResearcherAgent;

impl StubAgent for ResearcherAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Researcher
    }

    fn phase(&self) -> SessionStatus {
        SessionStatus::Researching
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError> {
        let query = WebSearchQuery::new(fixtures::SEARCH_QUERY)
            .with_locale(fixtures::SEARCH_COUNTRY, fixtures::SEARCH_LANGUAGE)
            .with_num(fixtures::SEARCH_RESULT_COUNT)
            .with_type(SearchType::News);
        let query_value = serde_json::to_value(&query)?;
        let query = WebSearchQuery::parse(&query_value)?;

        let results = fixtures::search_results()
            .iter()
            .map(WebSearchResult::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let output = AgentOutput::new(format!(
            "Collected {} search results for \"{}\"",
            results.len(),
            query.query
        ))
        .with_data(json!({ "query": query_value, "resultCount": results.len() }));

        ctx.search_query = Some(query);
        ctx.search_results = results;
        Ok(output)
    }
}

pub struct IdeatorAgent;

impl StubAgent for IdeatorAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Ideator
    }

    fn phase(&self) -> SessionStatus {
        SessionStatus::Generating
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError> {
        let ideas = fixtures::ideas()
            .iter()
            .map(BusinessIdea::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if ideas.is_empty() {
            return Err(PipelineError::NoIdeas);
        }

        let titles: Vec<&str> = ideas.iter().map(|i| i.title.as_str()).collect();
        let mut output = AgentOutput::new(format!(
            "Generated {} business ideas from {} research sources",
            ideas.len(),
            ctx.search_results.len()
        ))
        .with_data(json!({ "titles": titles }));

        output.ideas = ideas.clone();
        ctx.ideas = ideas;
        Ok(output)
    }
}

pub struct CriticAgent;

impl StubAgent for CriticAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Critic
    }

    fn phase(&self) -> SessionStatus {
        SessionStatus::Analyzing
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError> {
        if ctx.ideas.is_empty() {
            return Err(PipelineError::NoIdeas);
        }
        ctx.validations = ctx.ideas.iter().map(validate_idea).collect();

        let viable = ctx.validations.iter().filter(|v| v.is_viable).count();
        let scores: Vec<u32> = ctx.validations.iter().map(|v| v.score).collect();
        Ok(AgentOutput::new(format!(
            "Reviewed {} ideas: {} viable",
            ctx.ideas.len(),
            viable
        ))
        .with_data(json!({ "scores": scores })))
    }
}

pub struct AnalystAgent;

impl StubAgent for AnalystAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Analyst
    }

    fn phase(&self) -> SessionStatus {
        SessionStatus::Analyzing
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError> {
        let (index, best) = ctx
            .validations
            .iter()
            .enumerate()
            .max_by_key(|(_, v)| v.score)
            .ok_or(PipelineError::NoIdeas)?;
        let idea = &ctx.ideas[index];
        let analysis = analyze_strengths_and_weaknesses(idea, best);

        let output = AgentOutput::new(format!(
            "Selected \"{}\" ({}/100) for the report",
            idea.title, best.score
        ))
        .with_data(serde_json::to_value(&analysis)?);

        ctx.selected = Some(index);
        ctx.analysis = Some(analysis);
        Ok(output)
    }
}

pub struct WriterAgent;

fn scale(value: i64, factor: f64) -> i64 {
    (value as f64 * factor).round() as i64
}

impl StubAgent for WriterAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Writer
    }

    fn phase(&self) -> SessionStatus {
        SessionStatus::Analyzing
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<AgentOutput, PipelineError> {
        let index = ctx.selected.ok_or(PipelineError::NoIdeas)?;
        let idea = &ctx.ideas[index];
        let validation = &ctx.validations[index];
        let (strengths, weaknesses) = ctx
            .analysis
            .as_ref()
            .map(|a| (a.strengths.clone(), a.weaknesses.clone()))
            .unwrap_or_default();

        let revenue = idea.estimated_revenue.unwrap_or(fixtures::DEFAULT_ANNUAL_REVENUE);
        let investment = idea
            .initial_investment
            .unwrap_or(fixtures::DEFAULT_INITIAL_INVESTMENT);

        let som = scale(revenue, 3.0);
        let sam = scale(som, 20.0);
        let tam = scale(sam, 10.0);

        let difficulty_score = (30.0 + investment as f64 / 1_000_000.0 * 0.5).min(100.0);
        let synergy_score = f64::from(validation.score).min(100.0);

        let mut builder = ReportBuilder::new(ctx.session_id.clone(), idea.title.clone())
            .executive_summary(format!(
                "{} targets {} with a {} model. It scores {}/100 on viability with first-year revenue estimated at {}.",
                idea.title,
                idea.target_market,
                idea.revenue_model.to_lowercase(),
                validation.score,
                Money::yen(revenue)
            ))
            .business_model(BusinessModel {
                overview: idea.description.clone(),
                value_proposition: strengths
                    .first()
                    .cloned()
                    .unwrap_or_else(|| idea.description.clone()),
                customer_segments: vec![idea.target_market.clone()],
                revenue_streams: vec![RevenueStream {
                    name: idea.revenue_model.clone(),
                    description: format!("Primary revenue from {}", idea.target_market),
                    annual_revenue: Money::yen(revenue),
                }],
                cost_structure: vec![
                    CostItem {
                        name: "Initial investment".to_string(),
                        amount: Money::yen(investment),
                        recurring: false,
                    },
                    CostItem {
                        name: "Operations and fulfilment".to_string(),
                        amount: Money::yen(scale(revenue, 0.6)),
                        recurring: true,
                    },
                ],
            })
            .market_analysis(MarketAnalysis {
                tam: Money::yen(tam),
                sam: Money::yen(sam),
                som: Money::yen(som),
                growth_rate: Percentage::new(fixtures::MARKET_GROWTH_RATE),
                trends: ctx.search_results.iter().take(3).map(|r| r.title.clone()).collect(),
                competitive_position: CompetitivePosition {
                    market_share: Percentage::new(som as f64 / sam as f64 * 100.0),
                    competitors: fixtures::competitors(),
                    differentiators: strengths.clone(),
                },
            })
            .synergy(SynergyScore::new(synergy_score, strengths.clone(), weaknesses.clone())?)
            .difficulty(ImplementationDifficulty {
                level: DifficultyLevel::from_score(difficulty_score),
                score: difficulty_score,
                estimated_months: 3 + (difficulty_score / 10.0).round() as u32,
                factors: fixtures::difficulty_factors(),
            });

        for (year, (growth, cost_ratio)) in [(1.0, 0.85), (1.8, 0.7), (2.6, 0.6)].iter().enumerate() {
            let year_revenue = scale(revenue, *growth);
            builder = builder.projection(FinancialProjection::new(
                year as u32 + 1,
                year_revenue,
                scale(year_revenue, *cost_ratio),
            ));
        }

        for (n, (name, weeks, share, activities, criteria)) in
            fixtures::validation_phases().into_iter().enumerate()
        {
            builder = builder.validation_phase(ValidationPhase {
                phase: n as u32 + 1,
                name: name.to_string(),
                duration_weeks: weeks,
                budget: Money::yen(investment * share / 100),
                activities: activities.into_iter().map(str::to_string).collect(),
                success_criteria: criteria.into_iter().map(str::to_string).collect(),
            });
        }

        let mut evaluation = validation.issues.clone();
        evaluation.extend(validation.recommendations.iter().cloned());
        let sources: Vec<String> = ctx
            .search_results
            .iter()
            .map(|r| format!("{} ({})", r.title, r.link))
            .collect();

        let report = builder
            .section("Idea Evaluation", evaluation.join("\n"))
            .section("Strengths and Weaknesses", {
                let mut lines = strengths;
                lines.extend(weaknesses);
                lines.join("\n")
            })
            .section("Research Sources", sources.join("\n"))
            .build()?;

        let grade = report.synergy_score.grade;
        let output = AgentOutput::new(format!(
            "Wrote report \"{}\" with {} sections, synergy grade {} ({})",
            report.title,
            report.metrics.section_count,
            grade,
            grade.label()
        ))
        .with_data(json!({
            "reportId": report.id,
            "dataQualityScore": report.metrics.data_quality_score
        }));

        ctx.report = Some(report);
        Ok(output)
    }
}
