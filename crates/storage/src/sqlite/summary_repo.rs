use count_core::model::PracticeSummary;

use super::SqliteRepository;
use super::mapping::{map_summary_row, map_summary_row_with_id};
use crate::repository::{PracticeSummaryRepository, PracticeSummaryRow, StorageError};

#[async_trait::async_trait]
impl PracticeSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &PracticeSummary) -> Result<i64, StorageError> {
        let config = summary.config();
        let res = sqlx::query(
            r"
                INSERT INTO practice_summaries (
                    mode, crossing_kind, step, start_value, direction, count,
                    score, total_attempts, decade_crossings, hundred_crossings,
                    started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(config.mode().as_str())
        .bind(config.mode().crossing_kind().map(|k| k.as_str()))
        .bind(i64::from(config.step().value()))
        .bind(config.start())
        .bind(config.direction().as_str())
        .bind(i64::from(config.count()))
        .bind(i64::from(summary.score()))
        .bind(i64::from(summary.total_attempts()))
        .bind(i64::from(summary.decade_crossings()))
        .bind(i64::from(summary.hundred_crossings()))
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<PracticeSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    mode, crossing_kind, step, start_value, direction, count,
                    score, total_attempts, decade_crossings, hundred_crossings,
                    started_at, completed_at
                FROM practice_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(&self, limit: u32) -> Result<Vec<PracticeSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, mode, crossing_kind, step, start_value, direction, count,
                    score, total_attempts, decade_crossings, hundred_crossings,
                    started_at, completed_at
                FROM practice_summaries
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }
        Ok(out)
    }
}
