//! FAQ repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Faq, FaqQuery, FaqRequest, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct FaqRow {
    id: i64,
    question: String,
    answer: String,
    active: i64,
    position: i64,
}

pub struct FaqRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FaqRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, request: &FaqRequest) -> Result<Faq> {
        let result = sqlx::query(
            "INSERT INTO faqs (question, answer, active, position) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.active as i64)
        .bind(request.position)
        .execute(self.pool)
        .await
        .context("Failed to insert FAQ entry")?;

        Ok(Faq {
            id: result.last_insert_rowid(),
            question: request.question.clone(),
            answer: request.answer.clone(),
            active: request.active,
            position: request.position,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Faq>> {
        let row = sqlx::query_as::<_, FaqRow>(
            "SELECT id, question, answer, active, position FROM faqs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch FAQ entry")?;

        Ok(row.map(row_to_faq))
    }

    pub async fn update(&self, id: i64, request: &FaqRequest) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE faqs SET question = ?, answer = ?, active = ?, position = ? WHERE id = ?",
        )
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.active as i64)
        .bind(request.position)
        .bind(id)
        .execute(self.pool)
        .await
        .context("Failed to update FAQ entry")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete FAQ entry")?;

        Ok(result.rows_affected() > 0)
    }

    /// Admin listing: all entries, optional substring search.
    pub async fn list(&self, query: &FaqQuery) -> Result<(Vec<Faq>, i64)> {
        self.list_inner(query, false).await
    }

    /// Portal listing: active entries only.
    pub async fn list_active(&self, query: &FaqQuery) -> Result<(Vec<Faq>, i64)> {
        self.list_inner(query, true).await
    }

    async fn list_inner(&self, query: &FaqQuery, active_only: bool) -> Result<(Vec<Faq>, i64)> {
        let mut clauses = Vec::new();
        if active_only {
            clauses.push("active = 1");
        }
        if query.search.is_some() {
            clauses.push("(LOWER(question) LIKE ? OR LOWER(answer) LIKE ?)");
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let count_sql = format!("SELECT COUNT(*) FROM faqs{filter}");
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(ref pattern) = pattern {
            count_q = count_q.bind(pattern).bind(pattern);
        }
        let (total,) = count_q
            .fetch_one(self.pool)
            .await
            .context("Failed to count FAQ entries")?;

        let pagination = Pagination {
            page: query.page,
            per_page: query.per_page,
        };
        let list_sql = format!(
            "SELECT id, question, answer, active, position FROM faqs{filter} \
             ORDER BY position, id LIMIT ? OFFSET ?"
        );
        let mut list_q = sqlx::query_as::<_, FaqRow>(&list_sql);
        if let Some(ref pattern) = pattern {
            list_q = list_q.bind(pattern).bind(pattern);
        }
        let rows = list_q
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await
            .context("Failed to list FAQ entries")?;

        Ok((rows.into_iter().map(row_to_faq).collect(), total))
    }
}

fn row_to_faq(row: FaqRow) -> Faq {
    Faq {
        id: row.id,
        question: row.question,
        answer: row.answer,
        active: row.active != 0,
        position: row.position as i32,
    }
}
