// Canned agent output used by the stub pipeline

use serde_json::{json, Value};

pub const SEARCH_QUERY: &str = "地方 食品 サブスクリプション 市場動向";
pub const SEARCH_COUNTRY: &str = "jp";
pub const SEARCH_LANGUAGE: &str = "ja";
pub const SEARCH_RESULT_COUNT: u32 = 10;

/// Market growth assumed for every fixture idea, percent per year
pub const MARKET_GROWTH_RATE: f64 = 8.5;

/// Fallback figures for ideas that omit their own estimates, in yen
pub const DEFAULT_ANNUAL_REVENUE: i64 = 50_000_000;
pub const DEFAULT_INITIAL_INVESTMENT: i64 = 20_000_000;

pub fn search_results() -> Vec<Value> {
    vec![
        json!({
            "title": "国内サブスクリプション市場、2025年に1兆円規模へ",
            "link": "https://news.example.jp/articles/subscription-market-2025",
            "snippet": "定期購入型サービスの市場規模は前年比8%増で推移しており、食品分野が成長を牽引している。",
            "date": "2025-01-10",
            "position": 1
        }),
        json!({
            "title": "Regional producers turn to direct-to-consumer boxes",
            "link": "https://www.example.com/food/regional-d2c-boxes",
            "snippet": "Farm cooperatives report higher margins selling seasonal boxes directly to urban households.",
            "position": 2
        }),
        json!({
            "title": "共働き世帯の食材宅配利用率が過去最高",
            "link": "https://research.example.jp/reports/meal-kit-usage",
            "snippet": "共働き世帯の42%が週1回以上食材宅配を利用。時短ニーズが背景に。",
            "date": "2024-11-28",
            "position": 3
        }),
    ]
}

pub fn ideas() -> Vec<Value> {
    vec![
        json!({
            "title": "Local farm subscription box",
            "description": "Weekly boxes of seasonal vegetables sourced from farms within 50km, delivered to urban households. Each box ships with recipes and producer stories to build loyalty.",
            "targetMarket": "Dual-income households in Tokyo",
            "revenueModel": "Monthly subscription",
            "estimatedRevenue": 120000000,
            "initialInvestment": 30000000,
            "category": "food",
            "tags": ["food", "subscription", "local"]
        }),
        json!({
            "title": "Farm-to-office snack marketplace",
            "description": "A marketplace where regional producers sell healthy snacks to offices, with curated monthly assortments and usage analytics for HR teams.",
            "targetMarket": "Mid-size companies",
            "revenueModel": "Marketplace commission",
            "estimatedRevenue": 60000000,
            "initialInvestment": 45000000,
            "category": "food",
            "tags": ["b2b", "marketplace"]
        }),
        json!({
            "title": "Surplus produce rescue app",
            "description": "Mobile app that lists misshapen or surplus produce at a discount for pickup.",
            "targetMarket": "Students",
            "revenueModel": "Listing fees",
            "category": "food"
        }),
    ]
}

pub fn competitors() -> Vec<String> {
    vec![
        "Oisix".to_string(),
        "Radish Boya".to_string(),
        "Co-op home delivery".to_string(),
    ]
}

pub fn difficulty_factors() -> Vec<String> {
    vec![
        "Cold-chain logistics for perishable goods".to_string(),
        "Onboarding and quality control of small producers".to_string(),
        "Customer acquisition cost in a crowded market".to_string(),
    ]
}

/// (name, weeks, share of initial investment in percent, activities, success criteria)
pub fn validation_phases() -> Vec<(&'static str, u32, i64, Vec<&'static str>, Vec<&'static str>)> {
    vec![
        (
            "Problem interviews",
            3,
            5,
            vec!["Interview 30 target customers", "Map current purchasing habits"],
            vec!["At least 60% confirm the problem"],
        ),
        (
            "Concierge pilot",
            6,
            15,
            vec!["Deliver manually to 50 households", "Collect weekly feedback"],
            vec!["70% of pilot users renew after one month"],
        ),
        (
            "Paid launch in one district",
            12,
            30,
            vec!["Launch landing page and ads", "Partner with 10 producers"],
            vec!["300 paying subscribers", "CAC below 8,000 yen"],
        ),
    ]
}
