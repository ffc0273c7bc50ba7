use count_core::model::{
    CrossingKind, Direction, PracticeConfig, PracticeConfigDraft, PracticeMode, PracticeSummary,
};
use sqlx::Row;

use crate::repository::{PracticeSummaryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_crossing_kind(raw: Option<String>) -> Result<Option<CrossingKind>, StorageError> {
    raw.map(|s| s.parse::<CrossingKind>().map_err(ser)).transpose()
}

fn map_config(row: &sqlx::sqlite::SqliteRow) -> Result<PracticeConfig, StorageError> {
    let mode_str: String = row.try_get("mode").map_err(ser)?;
    let crossing = parse_crossing_kind(row.try_get("crossing_kind").map_err(ser)?)?;
    let mode = PracticeMode::from_parts(&mode_str, crossing).map_err(ser)?;

    let direction_str: String = row.try_get("direction").map_err(ser)?;
    let direction: Direction = direction_str.parse().map_err(ser)?;

    PracticeConfigDraft {
        mode,
        step: u32_from_i64("step", row.try_get::<i64, _>("step").map_err(ser)?)?,
        start: row.try_get("start_value").map_err(ser)?,
        direction,
        count: u32_from_i64("count", row.try_get::<i64, _>("count").map_err(ser)?)?,
    }
    .validate()
    .map_err(ser)
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<PracticeSummary, StorageError> {
    let config = map_config(row)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total_attempts = u32_from_i64(
        "total_attempts",
        row.try_get::<i64, _>("total_attempts").map_err(ser)?,
    )?;
    let decade_crossings = u32_from_i64(
        "decade_crossings",
        row.try_get::<i64, _>("decade_crossings").map_err(ser)?,
    )?;
    let hundred_crossings = u32_from_i64(
        "hundred_crossings",
        row.try_get::<i64, _>("hundred_crossings").map_err(ser)?,
    )?;

    PracticeSummary::from_persisted(
        config,
        score,
        total_attempts,
        decade_crossings,
        hundred_crossings,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PracticeSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(PracticeSummaryRow::new(id, map_summary_row(row)?))
}
