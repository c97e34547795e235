//! Expense and creditor repository
//!
//! Import runs in a single transaction covering both the creditor rows
//! and the expense rows, so an aborted batch leaves nothing behind.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::{ExpenseQuery, ExpenseWithCreditor, NewExpense, Pagination};

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    fiscal_year: i64,
    commitment_number: String,
    commitment_date: String,
    agency_name: String,
    creditor_name: String,
    creditor_document: String,
    expense_element: String,
    committed: String,
    settled: String,
    paid: String,
    note: Option<String>,
}

pub struct ExpenseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ExpenseRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an import batch atomically, resolving or creating each
    /// creditor inside the same transaction. Returns the inserted count.
    pub async fn insert_batch(&self, records: &[NewExpense]) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin expense import transaction")?;

        for record in records {
            let creditor_id = find_or_create_creditor(
                &mut tx,
                &record.creditor_document,
                &record.creditor_name,
                &record.creditor_person_type,
            )
            .await?;

            sqlx::query(
                r#"
                INSERT INTO expenses (fiscal_year, commitment_number, commitment_date, agency_name,
                    creditor_id, expense_element, committed, settled, paid, note)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.fiscal_year)
            .bind(&record.commitment_number)
            .bind(record.commitment_date.format(DATE_FMT).to_string())
            .bind(&record.agency_name)
            .bind(creditor_id)
            .bind(&record.expense_element)
            .bind(record.committed.to_string())
            .bind(record.settled.to_string())
            .bind(record.paid.to_string())
            .bind(record.note.as_deref())
            .execute(&mut *tx)
            .await
            .context("Failed to insert expense record")?;
        }

        tx.commit()
            .await
            .context("Failed to commit expense import transaction")?;

        Ok(records.len())
    }

    /// Paginated listing joined with creditor data, newest commitment first.
    pub async fn list(&self, query: &ExpenseQuery) -> Result<(Vec<ExpenseWithCreditor>, i64)> {
        let filter = if query.year.is_some() {
            " WHERE e.fiscal_year = ?"
        } else {
            ""
        };

        let count_sql = format!("SELECT COUNT(*) FROM expenses e{filter}");
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(year) = query.year {
            count_q = count_q.bind(year);
        }
        let (total,) = count_q
            .fetch_one(self.pool)
            .await
            .context("Failed to count expense records")?;

        let pagination = Pagination {
            page: query.page,
            per_page: query.per_page,
        };
        let list_sql = format!(
            r#"
            SELECT e.id, e.fiscal_year, e.commitment_number, e.commitment_date, e.agency_name,
                   c.corporate_name AS creditor_name, c.document AS creditor_document,
                   e.expense_element, e.committed, e.settled, e.paid, e.note
            FROM expenses e
            JOIN creditors c ON c.id = e.creditor_id{filter}
            ORDER BY e.commitment_date DESC, e.id DESC
            LIMIT ? OFFSET ?
            "#
        );
        let mut list_q = sqlx::query_as::<_, ExpenseRow>(&list_sql);
        if let Some(year) = query.year {
            list_q = list_q.bind(year);
        }
        let rows = list_q
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await
            .context("Failed to list expense records")?;

        Ok((rows.into_iter().map(row_to_expense).collect(), total))
    }
}

/// Look up a creditor by its digits-only document, creating it on first sight.
async fn find_or_create_creditor(
    tx: &mut Transaction<'_, Sqlite>,
    document: &str,
    corporate_name: &str,
    person_type: &str,
) -> Result<i64> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM creditors WHERE document = ?")
            .bind(document)
            .fetch_optional(&mut **tx)
            .await
            .context("Failed to look up creditor")?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let result = sqlx::query(
        "INSERT INTO creditors (document, corporate_name, person_type) VALUES (?, ?, ?)",
    )
    .bind(document)
    .bind(corporate_name)
    .bind(person_type)
    .execute(&mut **tx)
    .await
    .context("Failed to insert creditor")?;

    Ok(result.last_insert_rowid())
}

fn row_to_expense(row: ExpenseRow) -> ExpenseWithCreditor {
    ExpenseWithCreditor {
        id: row.id,
        fiscal_year: row.fiscal_year as i32,
        commitment_number: row.commitment_number,
        commitment_date: NaiveDate::parse_from_str(&row.commitment_date, DATE_FMT)
            .unwrap_or_default(),
        agency_name: row.agency_name,
        creditor_name: row.creditor_name,
        creditor_document: row.creditor_document,
        expense_element: row.expense_element,
        committed: row.committed.parse().unwrap_or(Decimal::ZERO),
        settled: row.settled.parse().unwrap_or(Decimal::ZERO),
        paid: row.paid.parse().unwrap_or(Decimal::ZERO),
        note: row.note,
    }
}
