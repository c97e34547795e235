//! Revenue service
//!
//! Bulk CSV import, batch rollback and audited CRUD over revenue records.

use rust_decimal::Decimal;

use crate::db::{DbPool, RevenueRepository};
use crate::import::{
    generate_batch_id,
    row::{map_row, COLUMN_COUNT},
    ImportError,
};
use crate::models::{
    actions, entities, AuditEvent, ImportOutcome, NewRevenue, Page, RequestContext, Revenue,
    RevenueQuery, RevenueRequest, RevenueSummary, RevenueTotal, RollbackOutcome,
};
use crate::services::audit::AuditRecorder;
use crate::utils::{AppError, AppResult};

pub struct RevenueService<'a> {
    pool: &'a DbPool,
    audit: &'a AuditRecorder,
}

impl<'a> RevenueService<'a> {
    pub fn new(pool: &'a DbPool, audit: &'a AuditRecorder) -> Self {
        Self { pool, audit }
    }

    /// Import a semicolon-delimited revenue file. All rows land in one
    /// transaction under a fresh batch id, or none do.
    pub async fn import_csv(
        &self,
        content: &[u8],
        context: RequestContext,
    ) -> AppResult<ImportOutcome> {
        let text = std::str::from_utf8(content)
            .map_err(|_| ImportError::Io("file is not valid UTF-8".to_string()))?;

        let batch_id = generate_batch_id();
        let records = parse_revenue_file(text, &batch_id)?;
        if records.is_empty() {
            return Err(AppError::bad_request("file contains no data rows"));
        }

        let imported = RevenueRepository::new(self.pool)
            .insert_batch(&records)
            .await?;

        let summary = format!("Imported {} records for batch {}", imported, batch_id);
        self.audit.record(AuditEvent::new(
            actions::IMPORT_BATCH_CSV,
            entities::REVENUE,
            batch_id.clone(),
            None,
            Some(serde_json::Value::String(summary)),
            context,
        ));

        Ok(ImportOutcome { batch_id, imported })
    }

    /// Remove every record of one import batch. The full record list is
    /// serialized into the audit event before any row is deleted, so the
    /// rollback never outruns its own snapshot.
    pub async fn rollback_batch(
        &self,
        batch_id: &str,
        context: RequestContext,
    ) -> AppResult<RollbackOutcome> {
        let repo = RevenueRepository::new(self.pool);

        let records = repo.find_by_batch(batch_id).await?;
        if records.is_empty() {
            return Err(ImportError::BatchNotFound(batch_id.to_string()).into());
        }

        let prior_state = serde_json::to_value(&records)?;
        let summary = format!("Removed {} records of batch {}", records.len(), batch_id);
        self.audit.record(AuditEvent::new(
            actions::DELETE_BATCH_REVENUE,
            entities::REVENUE,
            batch_id.to_string(),
            Some(prior_state),
            Some(serde_json::Value::String(summary)),
            context,
        ));

        let removed = repo.delete_by_batch(batch_id).await?;

        Ok(RollbackOutcome {
            batch_id: batch_id.to_string(),
            removed: removed as usize,
        })
    }

    pub async fn create(
        &self,
        request: RevenueRequest,
        context: RequestContext,
    ) -> AppResult<Revenue> {
        let record = request.into_new_revenue();
        let revenue = RevenueRepository::new(self.pool).insert(&record).await?;

        self.audit.record(AuditEvent::new(
            actions::CREATE_REVENUE,
            entities::REVENUE,
            revenue.id.to_string(),
            None,
            Some(serde_json::to_value(&revenue)?),
            context,
        ));

        Ok(revenue)
    }

    pub async fn update(
        &self,
        id: i64,
        request: RevenueRequest,
        context: RequestContext,
    ) -> AppResult<Revenue> {
        let repo = RevenueRepository::new(self.pool);
        let existing = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("revenue record not found"))?;

        let mut record = request.into_new_revenue();
        // imported rows keep their batch tag through edits
        record.batch_id = existing.batch_id.clone();
        repo.update(id, &record).await?;

        let updated = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("revenue record not found"))?;

        self.audit.record(AuditEvent::new(
            actions::UPDATE_REVENUE,
            entities::REVENUE,
            id.to_string(),
            Some(serde_json::to_value(&existing)?),
            Some(serde_json::to_value(&updated)?),
            context,
        ));

        Ok(updated)
    }

    pub async fn delete(&self, id: i64, context: RequestContext) -> AppResult<()> {
        let repo = RevenueRepository::new(self.pool);
        let existing = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("revenue record not found"))?;

        repo.delete(id).await?;

        self.audit.record(AuditEvent::new(
            actions::DELETE_REVENUE,
            entities::REVENUE,
            id.to_string(),
            Some(serde_json::to_value(&existing)?),
            None,
            context,
        ));

        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<Revenue> {
        RevenueRepository::new(self.pool)
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("revenue record not found"))
    }

    pub async fn list(&self, query: &RevenueQuery) -> AppResult<Page<Revenue>> {
        let (items, total) = RevenueRepository::new(self.pool).list(query).await?;
        Ok(Page::new(items, total, query.page, query.per_page))
    }

    /// Collected sum of one fiscal year; zero when the year has no rows.
    pub async fn total_for_year(&self, year: i32) -> AppResult<RevenueTotal> {
        let query = RevenueQuery {
            year: Some(year),
            ..Default::default()
        };
        let records = RevenueRepository::new(self.pool).find_filtered(&query).await?;
        let total_collected: Decimal = records.iter().map(|r| r.collected).sum();

        Ok(RevenueTotal {
            year,
            total_collected,
        })
    }

    /// Aggregate totals of the filtered set; amounts are summed exactly.
    pub async fn summary(&self, query: &RevenueQuery) -> AppResult<RevenueSummary> {
        let records = RevenueRepository::new(self.pool).find_filtered(query).await?;
        let total_collected: Decimal = records.iter().map(|r| r.collected).sum();

        Ok(RevenueSummary {
            total_collected,
            total_records: records.len() as i64,
        })
    }
}

/// Parse all data rows of an import file. The first line is the header
/// and is always discarded; blank lines are ignored; row numbers count
/// data rows from one.
fn parse_revenue_file(text: &str, batch_id: &str) -> Result<Vec<NewRevenue>, ImportError> {
    let mut records = Vec::new();
    let mut row = 0usize;

    for line in text.lines().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        row += 1;

        let cells: Vec<&str> = line.split(';').collect();
        if cells.len() < COLUMN_COUNT {
            return Err(ImportError::Structural {
                row,
                found: cells.len(),
            });
        }

        let record = map_row(&cells, batch_id).map_err(|source| ImportError::Row { row, source })?;
        records.push(record);
    }

    Ok(records)
}
