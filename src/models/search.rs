// Web search query/result records used by the researcher agent

use crate::validation::{ObjectValidator, Schema, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_RESULTS: i64 = 1;
pub const MAX_RESULTS: i64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Search,
    News,
    Images,
}

impl SearchType {
    pub fn names() -> [&'static str; 3] {
        ["search", "news", "images"]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchQuery {
    pub query: String,
    /// Country hint (e.g. "jp")
    #[serde(default, rename = "gl", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Interface language hint (e.g. "ja")
    #[serde(default, rename = "hl", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
}

impl WebSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            country: None,
            language: None,
            num: None,
            search_type: None,
        }
    }

    pub fn with_locale(mut self, country: &str, language: &str) -> Self {
        self.country = Some(country.to_string());
        self.language = Some(language.to_string());
        self
    }

    pub fn with_num(mut self, num: u32) -> Self {
        self.num = Some(num);
        self
    }

    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }
}

impl Schema for WebSearchQuery {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.non_empty("query");
        v.opt_string("gl");
        v.opt_string("hl");
        v.integer("num", MIN_RESULTS, MAX_RESULTS, false);
        v.one_of("type", &SearchType::names(), false);
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Schema for WebSearchResult {
    fn check(value: &Value) -> ValidationErrors {
        let mut v = ObjectValidator::new(value);
        v.string("title");
        v.url("link", true);
        v.string("snippet");
        v.opt_string("date");
        v.integer("position", 1, i64::from(u32::MAX), false);
        v.finish()
    }
}
