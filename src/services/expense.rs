//! Expense service
//!
//! Latin-1 CSV import of committed expenses with on-the-fly creditor
//! registration. Unlike the revenue importer this one is lenient: short
//! rows are skipped, not fatal.

use encoding_rs::WINDOWS_1252;

use crate::db::{DbPool, ExpenseRepository};
use crate::import::{
    fields::{parse_currency, parse_date, parse_int, required_text},
    ImportError,
};
use crate::models::{
    person_type_for_document, ExpenseQuery, ExpenseWithCreditor, NewExpense, Page,
};
use crate::utils::{AppError, AppResult};
use crate::utils::validation::normalize_document;

/// Minimum column count of one expense row
const EXPENSE_COLUMN_COUNT: usize = 11;

/// Response of a successful expense import
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExpenseImportOutcome {
    pub imported: usize,
    pub skipped: usize,
}

pub struct ExpenseService<'a> {
    pool: &'a DbPool,
}

impl<'a> ExpenseService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Import an ISO-8859-1 expense file exported by the upstream
    /// accounting system. Parsing completes before anything touches the
    /// database; creditors and expenses then land in one transaction.
    pub async fn import_csv(&self, content: &[u8]) -> AppResult<ExpenseImportOutcome> {
        let (text, _, _) = WINDOWS_1252.decode(content);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut row = 0usize;

        for line in text.lines().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            row += 1;

            let cells: Vec<&str> = line.split(';').collect();
            if cells.len() < EXPENSE_COLUMN_COUNT {
                skipped += 1;
                continue;
            }

            let record = map_expense_row(&cells)
                .map_err(|source| ImportError::Row { row, source })?;

            let document = normalize_document(&record.creditor_document);
            let person_type = person_type_for_document(&document).to_string();

            records.push(NewExpense {
                fiscal_year: record.fiscal_year,
                commitment_number: record.commitment_number,
                commitment_date: record.commitment_date,
                agency_name: record.agency_name,
                creditor_document: document,
                creditor_name: record.creditor_name,
                creditor_person_type: person_type,
                expense_element: record.expense_element,
                committed: record.committed,
                settled: record.settled,
                paid: record.paid,
                note: record.note,
            });
        }

        if records.is_empty() {
            return Err(AppError::bad_request("file contains no importable rows"));
        }

        let imported = ExpenseRepository::new(self.pool).insert_batch(&records).await?;

        Ok(ExpenseImportOutcome { imported, skipped })
    }

    pub async fn list(&self, query: &ExpenseQuery) -> AppResult<Page<ExpenseWithCreditor>> {
        let (items, total) = ExpenseRepository::new(self.pool).list(query).await?;
        Ok(Page::new(items, total, query.page, query.per_page))
    }
}

struct ExpenseRow {
    fiscal_year: i32,
    commitment_number: String,
    commitment_date: chrono::NaiveDate,
    agency_name: String,
    creditor_document: String,
    creditor_name: String,
    expense_element: String,
    committed: rust_decimal::Decimal,
    settled: rust_decimal::Decimal,
    paid: rust_decimal::Decimal,
    note: Option<String>,
}

fn map_expense_row(cells: &[&str]) -> Result<ExpenseRow, crate::import::fields::FieldError> {
    Ok(ExpenseRow {
        fiscal_year: parse_int(cells[0], "fiscal_year")?,
        commitment_number: required_text(cells[1], "commitment_number")?,
        commitment_date: parse_date(cells[2])?,
        agency_name: required_text(cells[3], "agency_name")?,
        creditor_document: required_text(cells[4], "creditor_document")?,
        creditor_name: required_text(cells[5], "creditor_name")?,
        expense_element: required_text(cells[6], "expense_element")?,
        committed: parse_currency(cells[7])?,
        settled: parse_currency(cells[8])?,
        paid: parse_currency(cells[9])?,
        note: crate::import::fields::optional_text(cells[10]),
    })
}
