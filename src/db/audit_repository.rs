//! Audit log repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{AuditLogEntry, AuditLogQuery, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i64,
    user_id: Option<String>,
    user_name: String,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    prior_state: Option<String>,
    new_state: Option<String>,
    origin_ip: String,
    created_at: String,
}

pub struct AuditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        user_id: Option<Uuid>,
        user_name: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        prior_state: Option<&str>,
        new_state: Option<&str>,
        origin_ip: &str,
    ) -> Result<()> {
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, user_name, action, entity_type, entity_id,
                prior_state, new_state, origin_ip, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.map(|u| u.to_string()))
        .bind(user_name)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(prior_state)
        .bind(new_state)
        .bind(origin_ip)
        .bind(&created_at)
        .execute(self.pool)
        .await
        .context("Failed to insert audit log entry")?;

        Ok(())
    }

    /// Filtered paginated listing, newest first.
    pub async fn list(&self, query: &AuditLogQuery) -> Result<(Vec<AuditLogEntry>, i64)> {
        let mut clauses = Vec::new();
        if query.action.is_some() {
            clauses.push("LOWER(action) LIKE ?");
        }
        if query.entity.is_some() {
            clauses.push("LOWER(entity_type) LIKE ?");
        }
        if query.user.is_some() {
            clauses.push("LOWER(user_name) LIKE ?");
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let patterns: Vec<String> = [&query.action, &query.entity, &query.user]
            .into_iter()
            .flatten()
            .map(|s| format!("%{}%", s.to_lowercase()))
            .collect();

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs{filter}");
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_sql);
        for pattern in &patterns {
            count_q = count_q.bind(pattern);
        }
        let (total,) = count_q
            .fetch_one(self.pool)
            .await
            .context("Failed to count audit log entries")?;

        let pagination = Pagination {
            page: query.page,
            per_page: query.per_page,
        };
        let list_sql = format!(
            "SELECT id, user_id, user_name, action, entity_type, entity_id, prior_state, \
             new_state, origin_ip, created_at FROM audit_logs{filter} \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut list_q = sqlx::query_as::<_, AuditRow>(&list_sql);
        for pattern in &patterns {
            list_q = list_q.bind(pattern);
        }
        let rows = list_q
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await
            .context("Failed to list audit log entries")?;

        Ok((rows.into_iter().map(row_to_entry).collect(), total))
    }
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

fn row_to_entry(row: AuditRow) -> AuditLogEntry {
    AuditLogEntry {
        id: row.id,
        user_id: row.user_id.as_deref().and_then(|s| Uuid::parse_str(s).ok()),
        user_name: row.user_name,
        action: row.action,
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        prior_state: row.prior_state,
        new_state: row.new_state,
        origin_ip: row.origin_ip,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
