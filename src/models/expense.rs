//! Budget expense records and creditors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classify a digits-only document: CNPJ (14 digits) is a legal entity,
/// CPF (11 digits) a natural person.
pub fn person_type_for_document(document: &str) -> &'static str {
    if document.len() > 11 {
        "JURIDICA"
    } else {
        "FISICA"
    }
}

/// An expense before persistence. Carries the creditor's identity rather
/// than an id: the creditor row is resolved (or created) inside the same
/// transaction that inserts the expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub fiscal_year: i32,
    pub commitment_number: String,
    pub commitment_date: NaiveDate,
    pub agency_name: String,
    /// Digits-only CPF or CNPJ
    pub creditor_document: String,
    pub creditor_name: String,
    /// `JURIDICA` or `FISICA`, derived from the document length
    pub creditor_person_type: String,
    pub expense_element: String,
    pub committed: Decimal,
    pub settled: Decimal,
    pub paid: Decimal,
    pub note: Option<String>,
}

/// Public listing row: expense joined with its creditor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWithCreditor {
    pub id: i64,
    pub fiscal_year: i32,
    pub commitment_number: String,
    pub commitment_date: NaiveDate,
    pub agency_name: String,
    pub creditor_name: String,
    pub creditor_document: String,
    pub expense_element: String,
    pub committed: Decimal,
    pub settled: Decimal,
    pub paid: Decimal,
    pub note: Option<String>,
}

/// Query parameters for the expense listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseQuery {
    pub year: Option<i32>,
    #[serde(default = "crate::models::default_page")]
    pub page: u32,
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: u32,
}
