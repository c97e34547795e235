//! FAQ content model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A frequently-asked question shown on the public portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub active: bool,
    pub position: i32,
}

/// Request body for creating or replacing a FAQ entry
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FaqRequest {
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "answer is required"))]
    pub answer: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub position: i32,
}

fn default_active() -> bool {
    true
}

/// Query parameters for FAQ listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqQuery {
    /// Substring match over question and answer
    pub search: Option<String>,
    #[serde(default = "crate::models::default_page")]
    pub page: u32,
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: u32,
}
