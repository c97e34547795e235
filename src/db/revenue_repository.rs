//! Revenue repository
//!
//! Bulk import runs inside a single transaction so a batch lands
//! completely or not at all.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::models::{NewRevenue, Revenue, RevenueQuery};

const DATE_FMT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "id, fiscal_year, month, posting_date, economic_category, origin, \
     kind, rubric, clause, funding_source, initial_forecast, updated_forecast, collected, \
     note, imported_at, batch_id";

#[derive(Debug, sqlx::FromRow)]
struct RevenueRow {
    id: i64,
    fiscal_year: i64,
    month: i64,
    posting_date: String,
    economic_category: String,
    origin: String,
    kind: Option<String>,
    rubric: Option<String>,
    clause: Option<String>,
    funding_source: String,
    initial_forecast: Option<String>,
    updated_forecast: Option<String>,
    collected: String,
    note: Option<String>,
    imported_at: String,
    batch_id: Option<String>,
}

pub struct RevenueRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RevenueRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a whole import batch atomically and return the inserted count.
    pub async fn insert_batch(&self, records: &[NewRevenue]) -> Result<usize> {
        let imported_at = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin import transaction")?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO revenues (fiscal_year, month, posting_date, economic_category, origin,
                    kind, rubric, clause, funding_source, initial_forecast, updated_forecast,
                    collected, note, imported_at, batch_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.fiscal_year)
            .bind(record.month)
            .bind(record.posting_date.format(DATE_FMT).to_string())
            .bind(&record.economic_category)
            .bind(&record.origin)
            .bind(record.kind.as_deref())
            .bind(record.rubric.as_deref())
            .bind(record.clause.as_deref())
            .bind(&record.funding_source)
            .bind(record.initial_forecast.map(|d| d.to_string()))
            .bind(record.updated_forecast.map(|d| d.to_string()))
            .bind(record.collected.to_string())
            .bind(record.note.as_deref())
            .bind(&imported_at)
            .bind(record.batch_id.as_deref())
            .execute(&mut *tx)
            .await
            .context("Failed to insert revenue record")?;
        }

        tx.commit()
            .await
            .context("Failed to commit import transaction")?;

        Ok(records.len())
    }

    pub async fn insert(&self, record: &NewRevenue) -> Result<Revenue> {
        let imported_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO revenues (fiscal_year, month, posting_date, economic_category, origin,
                kind, rubric, clause, funding_source, initial_forecast, updated_forecast,
                collected, note, imported_at, batch_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.fiscal_year)
        .bind(record.month)
        .bind(record.posting_date.format(DATE_FMT).to_string())
        .bind(&record.economic_category)
        .bind(&record.origin)
        .bind(record.kind.as_deref())
        .bind(record.rubric.as_deref())
        .bind(record.clause.as_deref())
        .bind(&record.funding_source)
        .bind(record.initial_forecast.map(|d| d.to_string()))
        .bind(record.updated_forecast.map(|d| d.to_string()))
        .bind(record.collected.to_string())
        .bind(record.note.as_deref())
        .bind(&imported_at)
        .bind(record.batch_id.as_deref())
        .execute(self.pool)
        .await
        .context("Failed to insert revenue record")?;

        Ok(Revenue {
            id: result.last_insert_rowid(),
            fiscal_year: record.fiscal_year,
            month: record.month,
            posting_date: record.posting_date,
            economic_category: record.economic_category.clone(),
            origin: record.origin.clone(),
            kind: record.kind.clone(),
            rubric: record.rubric.clone(),
            clause: record.clause.clone(),
            funding_source: record.funding_source.clone(),
            initial_forecast: record.initial_forecast,
            updated_forecast: record.updated_forecast,
            collected: record.collected,
            note: record.note.clone(),
            imported_at: parse_db_timestamp(&imported_at),
            batch_id: record.batch_id.clone(),
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Revenue>> {
        let row = sqlx::query_as::<_, RevenueRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM revenues WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch revenue record")?;

        Ok(row.map(row_to_revenue))
    }

    pub async fn find_by_batch(&self, batch_id: &str) -> Result<Vec<Revenue>> {
        let rows = sqlx::query_as::<_, RevenueRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM revenues WHERE batch_id = ? ORDER BY id"
        ))
        .bind(batch_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch revenue batch")?;

        Ok(rows.into_iter().map(row_to_revenue).collect())
    }

    pub async fn delete_by_batch(&self, batch_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM revenues WHERE batch_id = ?")
            .bind(batch_id)
            .execute(self.pool)
            .await
            .context("Failed to delete revenue batch")?;

        Ok(result.rows_affected())
    }

    pub async fn update(&self, id: i64, record: &NewRevenue) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE revenues SET fiscal_year = ?, month = ?, posting_date = ?,
                economic_category = ?, origin = ?, kind = ?, rubric = ?, clause = ?,
                funding_source = ?, initial_forecast = ?, updated_forecast = ?,
                collected = ?, note = ?
            WHERE id = ?
            "#,
        )
        .bind(record.fiscal_year)
        .bind(record.month)
        .bind(record.posting_date.format(DATE_FMT).to_string())
        .bind(&record.economic_category)
        .bind(&record.origin)
        .bind(record.kind.as_deref())
        .bind(record.rubric.as_deref())
        .bind(record.clause.as_deref())
        .bind(&record.funding_source)
        .bind(record.initial_forecast.map(|d| d.to_string()))
        .bind(record.updated_forecast.map(|d| d.to_string()))
        .bind(record.collected.to_string())
        .bind(record.note.as_deref())
        .bind(id)
        .execute(self.pool)
        .await
        .context("Failed to update revenue record")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM revenues WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete revenue record")?;

        Ok(result.rows_affected() > 0)
    }

    /// Paginated filtered listing, newest posting date first.
    pub async fn list(&self, query: &RevenueQuery) -> Result<(Vec<Revenue>, i64)> {
        let filter = filter_clause(query);

        let count_sql = format!("SELECT COUNT(*) FROM revenues{filter}");
        let (total,): (i64,) = bind_filters(sqlx::query_as(&count_sql), query)
            .fetch_one(self.pool)
            .await
            .context("Failed to count revenue records")?;

        let pagination = crate::models::Pagination {
            page: query.page,
            per_page: query.per_page,
        };
        let list_sql = format!(
            "SELECT {SELECT_COLUMNS} FROM revenues{filter} \
             ORDER BY posting_date DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = bind_filters(sqlx::query_as::<_, RevenueRow>(&list_sql), query)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await
            .context("Failed to list revenue records")?;

        Ok((rows.into_iter().map(row_to_revenue).collect(), total))
    }

    /// Full filtered set without pagination, for file exports.
    pub async fn find_filtered(&self, query: &RevenueQuery) -> Result<Vec<Revenue>> {
        let filter = filter_clause(query);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM revenues{filter} ORDER BY posting_date DESC, id DESC"
        );
        let rows = bind_filters(sqlx::query_as::<_, RevenueRow>(&sql), query)
            .fetch_all(self.pool)
            .await
            .context("Failed to fetch revenue records for export")?;

        Ok(rows.into_iter().map(row_to_revenue).collect())
    }

    /// Fiscal years present in the data, most recent first.
    pub async fn distinct_years(&self) -> Result<Vec<i32>> {
        let years: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT fiscal_year FROM revenues ORDER BY fiscal_year DESC",
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list fiscal years")?;

        Ok(years.into_iter().map(|y| y as i32).collect())
    }
}

type SqliteArgs<'q> = <sqlx::Sqlite as sqlx::Database>::Arguments<'q>;

fn filter_clause(query: &RevenueQuery) -> String {
    let mut clauses = Vec::new();

    if query.year.is_some() {
        clauses.push("fiscal_year = ?");
    }
    if query.origin.is_some() {
        clauses.push("LOWER(origin) LIKE ?");
    }
    if query.category.is_some() {
        clauses.push("LOWER(economic_category) LIKE ?");
    }
    if query.source.is_some() {
        clauses.push("LOWER(funding_source) LIKE ?");
    }
    if query.date_from.is_some() {
        clauses.push("posting_date >= ?");
    }
    if query.date_to.is_some() {
        clauses.push("posting_date <= ?");
    }
    if query.imported_from.is_some() {
        clauses.push("imported_at >= ?");
    }
    if query.imported_to.is_some() {
        clauses.push("imported_at < ?");
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn bind_filters<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArgs<'q>>,
    query: &'q RevenueQuery,
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArgs<'q>>
where
    O: Send + Unpin,
{
    if let Some(year) = query.year {
        q = q.bind(year);
    }
    if let Some(ref origin) = query.origin {
        q = q.bind(format!("%{}%", origin.to_lowercase()));
    }
    if let Some(ref category) = query.category {
        q = q.bind(format!("%{}%", category.to_lowercase()));
    }
    if let Some(ref source) = query.source {
        q = q.bind(format!("%{}%", source.to_lowercase()));
    }
    if let Some(date_from) = query.date_from {
        q = q.bind(date_from.format(DATE_FMT).to_string());
    }
    if let Some(date_to) = query.date_to {
        q = q.bind(date_to.format(DATE_FMT).to_string());
    }
    if let Some(imported_from) = query.imported_from {
        q = q.bind(imported_from.format(DATE_FMT).to_string());
    }
    if let Some(imported_to) = query.imported_to {
        // exclusive upper bound on the day after, imported_at is RFC 3339
        let next = imported_to + chrono::Duration::days(1);
        q = q.bind(next.format(DATE_FMT).to_string());
    }
    q
}

fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

fn parse_db_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, DATE_FMT).unwrap_or_default()
}

fn parse_db_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or(Decimal::ZERO)
}

fn row_to_revenue(row: RevenueRow) -> Revenue {
    Revenue {
        id: row.id,
        fiscal_year: row.fiscal_year as i32,
        month: row.month as i32,
        posting_date: parse_db_date(&row.posting_date),
        economic_category: row.economic_category,
        origin: row.origin,
        kind: row.kind,
        rubric: row.rubric,
        clause: row.clause,
        funding_source: row.funding_source,
        initial_forecast: row.initial_forecast.as_deref().map(parse_db_decimal),
        updated_forecast: row.updated_forecast.as_deref().map(parse_db_decimal),
        collected: parse_db_decimal(&row.collected),
        note: row.note,
        imported_at: parse_db_timestamp(&row.imported_at),
        batch_id: row.batch_id,
    }
}
