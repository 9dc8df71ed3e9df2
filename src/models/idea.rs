// Business idea submitted for validation or produced by the ideator

use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdea {
    pub title: String,
    pub description: String,
    pub target_market: String,
    pub revenue_model: String,
    /// Expected annual revenue in yen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_revenue: Option<i64>,
    /// Up-front investment in yen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_investment: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Schema for BusinessIdea {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.text("title", 1, MAX_TITLE_CHARS, true);
        v.text(
            "description",
            MIN_DESCRIPTION_CHARS,
            MAX_DESCRIPTION_CHARS,
            true,
        );
        v.non_empty("targetMarket");
        v.non_empty("revenueModel");
        v.integer("estimatedRevenue", 0, i64::MAX, false);
        v.integer("initialInvestment", 0, i64::MAX, false);
        v.opt_string("category");
        v.string_list("tags", MAX_TAGS, false);
        v.finish()
    }
}
