//! Budget revenue records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One persisted budget revenue entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revenue {
    pub id: i64,
    pub fiscal_year: i32,
    pub month: i32,
    pub posting_date: NaiveDate,
    pub economic_category: String,
    pub origin: String,
    /// Espécie (optional classification level)
    pub kind: Option<String>,
    /// Rubrica (optional classification level)
    pub rubric: Option<String>,
    /// Alínea (optional classification level)
    pub clause: Option<String>,
    pub funding_source: String,
    pub initial_forecast: Option<Decimal>,
    pub updated_forecast: Option<Decimal>,
    pub collected: Decimal,
    pub note: Option<String>,
    pub imported_at: DateTime<Utc>,
    /// Import batch tag; null for rows entered through the admin CRUD
    pub batch_id: Option<String>,
}

/// A revenue record before persistence (no id, no import timestamp)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRevenue {
    pub fiscal_year: i32,
    pub month: i32,
    pub posting_date: NaiveDate,
    pub economic_category: String,
    pub origin: String,
    pub kind: Option<String>,
    pub rubric: Option<String>,
    pub clause: Option<String>,
    pub funding_source: String,
    pub initial_forecast: Option<Decimal>,
    pub updated_forecast: Option<Decimal>,
    pub collected: Decimal,
    pub note: Option<String>,
    pub batch_id: Option<String>,
}

/// Request body for creating or replacing one revenue record
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RevenueRequest {
    pub fiscal_year: i32,
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: i32,
    pub posting_date: NaiveDate,
    #[validate(length(min = 1, message = "economic_category is required"))]
    pub economic_category: String,
    #[validate(length(min = 1, message = "origin is required"))]
    pub origin: String,
    pub kind: Option<String>,
    pub rubric: Option<String>,
    pub clause: Option<String>,
    #[validate(length(min = 1, message = "funding_source is required"))]
    pub funding_source: String,
    pub initial_forecast: Option<Decimal>,
    pub updated_forecast: Option<Decimal>,
    pub collected: Decimal,
    pub note: Option<String>,
}

impl RevenueRequest {
    /// Convert into a record for persistence; manual entries carry no batch id
    pub fn into_new_revenue(self) -> NewRevenue {
        NewRevenue {
            fiscal_year: self.fiscal_year,
            month: self.month,
            posting_date: self.posting_date,
            economic_category: self.economic_category.trim().to_string(),
            origin: self.origin.trim().to_string(),
            kind: normalize_optional(self.kind),
            rubric: normalize_optional(self.rubric),
            clause: normalize_optional(self.clause),
            funding_source: self.funding_source.trim().to_string(),
            initial_forecast: self.initial_forecast,
            updated_forecast: self.updated_forecast,
            collected: self.collected,
            note: normalize_optional(self.note),
            batch_id: None,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Query parameters for the revenue listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueQuery {
    pub year: Option<i32>,
    pub origin: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub imported_from: Option<NaiveDate>,
    pub imported_to: Option<NaiveDate>,
    #[serde(default = "crate::models::default_page")]
    pub page: u32,
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: u32,
}

/// Public portal filter set: the admin filters minus the import-timestamp
/// range, which stays internal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicRevenueQuery {
    pub year: Option<i32>,
    pub origin: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default = "crate::models::default_page")]
    pub page: u32,
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: u32,
}

impl PublicRevenueQuery {
    pub fn into_query(self) -> RevenueQuery {
        RevenueQuery {
            year: self.year,
            origin: self.origin,
            category: self.category,
            source: self.source,
            date_from: self.date_from,
            date_to: self.date_to,
            imported_from: None,
            imported_to: None,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Public portal projection of a revenue record (no internal columns)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRevenue {
    pub fiscal_year: i32,
    pub month: i32,
    pub posting_date: NaiveDate,
    pub economic_category: String,
    pub origin: String,
    pub kind: Option<String>,
    pub rubric: Option<String>,
    pub clause: Option<String>,
    pub funding_source: String,
    pub initial_forecast: Option<Decimal>,
    pub updated_forecast: Option<Decimal>,
    pub collected: Decimal,
    pub note: Option<String>,
}

impl From<Revenue> for PublicRevenue {
    fn from(r: Revenue) -> Self {
        Self {
            fiscal_year: r.fiscal_year,
            month: r.month,
            posting_date: r.posting_date,
            economic_category: r.economic_category,
            origin: r.origin,
            kind: r.kind,
            rubric: r.rubric,
            clause: r.clause,
            funding_source: r.funding_source,
            initial_forecast: r.initial_forecast,
            updated_forecast: r.updated_forecast,
            collected: r.collected,
            note: r.note,
        }
    }
}

/// Aggregate summary of a filtered revenue set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_collected: Decimal,
    pub total_records: i64,
}

/// Collected total of one fiscal year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueTotal {
    pub year: i32,
    pub total_collected: Decimal,
}

/// Response of a successful bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub imported: usize,
}

/// Response of a successful batch rollback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackOutcome {
    pub batch_id: String,
    pub removed: usize,
}
