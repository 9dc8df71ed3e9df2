// HTML rendering of reports using Tera

use super::{HtmlReport, ReportError};
use tera::{Context, Tera};

const REPORT_TEMPLATE_NAME: &str = "report.html";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
</head>
<body>
<article id="report-{{ id }}">
<header>
<h1>{{ title }}</h1>
<p class="generated">Generated {{ generatedAt }}</p>
</header>

<section id="executive-summary">
<h2>Executive Summary</h2>
<p>{{ executiveSummary }}</p>
</section>

<section id="business-model">
<h2>Business Model</h2>
<p>{{ businessModel.overview }}</p>
<p><strong>Value proposition:</strong> {{ businessModel.valueProposition }}</p>
<ul class="segments">
{% for segment in businessModel.customerSegments %}<li>{{ segment }}</li>
{% endfor %}</ul>
<table class="revenue-streams">
<tr><th>Stream</th><th>Description</th><th>Annual revenue</th></tr>
{% for stream in businessModel.revenueStreams %}<tr><td>{{ stream.name }}</td><td>{{ stream.description }}</td><td>{{ stream.annualRevenue.formatted }}</td></tr>
{% endfor %}</table>
<table class="costs">
<tr><th>Cost</th><th>Amount</th><th>Recurring</th></tr>
{% for cost in businessModel.costStructure %}<tr><td>{{ cost.name }}</td><td>{{ cost.amount.formatted }}</td><td>{% if cost.recurring %}yes{% else %}no{% endif %}</td></tr>
{% endfor %}</table>
</section>

<section id="market-analysis">
<h2>Market Analysis</h2>
<dl>
<dt>TAM</dt><dd>{{ marketAnalysis.tam.formatted }}</dd>
<dt>SAM</dt><dd>{{ marketAnalysis.sam.formatted }}</dd>
<dt>SOM</dt><dd>{{ marketAnalysis.som.formatted }}</dd>
<dt>Growth rate</dt><dd>{{ marketAnalysis.growthRate.formatted }}</dd>
<dt>Market share</dt><dd>{{ marketAnalysis.competitivePosition.marketShare.formatted }}</dd>
</dl>
<ul class="trends">
{% for trend in marketAnalysis.trends %}<li>{{ trend }}</li>
{% endfor %}</ul>
</section>

<section id="financial-projections">
<h2>Financial Projections</h2>
<table>
<tr><th>Year</th><th>Revenue</th><th>Costs</th><th>Profit</th><th>Margin</th></tr>
{% for p in financialProjections %}<tr><td>{{ p.year }}</td><td>{{ p.revenue.formatted }}</td><td>{{ p.costs.formatted }}</td><td>{{ p.profit.formatted }}</td><td>{{ p.profitMargin.formatted }}</td></tr>
{% endfor %}</table>
</section>

<section id="synergy">
<h2>Synergy Score</h2>
<p class="grade grade-{{ synergyScore.grade }}">{{ synergyScore.grade }} ({{ synergyScore.score | round(precision=1) }})</p>
<ul class="opportunities">
{% for item in synergyScore.opportunities %}<li>{{ item }}</li>
{% endfor %}</ul>
<ul class="risks">
{% for item in synergyScore.risks %}<li>{{ item }}</li>
{% endfor %}</ul>
</section>

<section id="implementation">
<h2>Implementation Difficulty</h2>
<p>{{ implementationDifficulty.level }} ({{ implementationDifficulty.score | round(precision=1) }}), about {{ implementationDifficulty.estimatedMonths }} months</p>
<ul>
{% for factor in implementationDifficulty.factors %}<li>{{ factor }}</li>
{% endfor %}</ul>
</section>

<section id="validation-plan">
<h2>Validation Plan</h2>
{% for phase in validationPlan.phases %}<div class="phase">
<h3>Phase {{ phase.phase }}: {{ phase.name }}</h3>
<p>{{ phase.durationWeeks }} weeks, {{ phase.budget.formatted }}</p>
<ul>{% for activity in phase.activities %}<li>{{ activity }}</li>{% endfor %}</ul>
<ul class="criteria">{% for criterion in phase.successCriteria %}<li>{{ criterion }}</li>{% endfor %}</ul>
</div>
{% endfor %}<p class="total">Total budget: {{ validationPlan.totalBudget.formatted }}</p>
</section>

{% for section in sections %}<section id="{{ section.id }}">
<h2>{{ section.title }}</h2>
<p>{{ section.content }}</p>
</section>
{% endfor %}
<footer>
<p>Completeness {{ metrics.completionPercentage | round(precision=1) }}%, data quality {{ metrics.dataQualityScore | round(precision=1) }}</p>
</footer>
</article>
</body>
</html>
"#;

/// Renders reports to standalone HTML documents. All report text is escaped.
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, report: &HtmlReport) -> Result<String, ReportError> {
        let context = Context::from_serialize(report)?;
        Ok(self.tera.render(REPORT_TEMPLATE_NAME, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Money, ReportBuilder, ValidationPhase};

    #[test]
    fn test_renders_formatted_amounts() {
        let report = ReportBuilder::new("s1", "Farm box")
            .executive_summary("Fresh produce")
            .validation_phase(ValidationPhase {
                phase: 1,
                name: "Smoke test".to_string(),
                duration_weeks: 2,
                budget: Money::yen(7_000_000),
                activities: vec![],
                success_criteria: vec![],
            })
            .build()
            .unwrap();
        let html = ReportRenderer::new().unwrap().render(&report).unwrap();
        assert!(html.contains("<h1>Farm box</h1>"));
        assert!(html.contains("Total budget: ¥7,000,000"));
        assert!(html.contains("Phase 1: Smoke test"));
        assert!(html.contains("<dt>Growth rate</dt><dd>0.0%</dd>"));
    }

    #[test]
    fn test_escapes_report_text() {
        let report = ReportBuilder::new("s1", "<script>alert(1)</script>")
            .section("Notes", "a < b & c")
            .build()
            .unwrap();
        let html = ReportRenderer::new().unwrap().render(&report).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &lt; b &amp; c"));
    }
}
