//! Canonical record operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{CanonicalRecord, Figures, Processor};

/// Result of upserting one canonical record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUpsert {
    /// No record existed for the key
    Inserted,
    /// An existing record had strictly lower revenue and was replaced
    Superseded,
    /// The existing record had equal or higher revenue and was kept
    KeptExisting,
}

/// Counters for one import batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub superseded: usize,
    pub kept_existing: usize,
}

impl Database {
    /// Upsert one record keyed by (processor, month, merchant_id).
    ///
    /// On conflict the projected revenue decides: a strictly higher value
    /// supersedes the stored record, ties and lower values keep it. Feeding
    /// the same data twice is therefore a no-op.
    pub fn upsert_record(&self, record: &CanonicalRecord) -> Result<RecordUpsert> {
        let conn = self.conn()?;

        let existing: Option<(i64, f64)> = conn
            .query_row(
                "SELECT id, revenue FROM records
                 WHERE processor = ? AND month = ? AND merchant_id = ?",
                params![record.processor.as_str(), record.month, record.merchant_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let figures = serde_json::to_string(&record.figures)?;

        match existing {
            None => {
                conn.execute(
                    r#"
                    INSERT INTO records (processor, month, merchant_id, merchant_name, branch_id, revenue, figures)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                    params![
                        record.processor.as_str(),
                        record.month,
                        record.merchant_id,
                        record.merchant_name,
                        record.branch_id,
                        record.revenue(),
                        figures,
                    ],
                )?;
                Ok(RecordUpsert::Inserted)
            }
            Some((id, revenue)) if record.revenue() > revenue => {
                conn.execute(
                    r#"
                    UPDATE records
                    SET merchant_name = ?, branch_id = ?, revenue = ?, figures = ?
                    WHERE id = ?
                    "#,
                    params![
                        record.merchant_name,
                        record.branch_id,
                        record.revenue(),
                        figures,
                        id,
                    ],
                )?;
                Ok(RecordUpsert::Superseded)
            }
            Some(_) => Ok(RecordUpsert::KeptExisting),
        }
    }

    /// Upsert a batch, tallying outcomes
    pub fn upsert_records(&self, records: &[CanonicalRecord]) -> Result<ImportStats> {
        let mut stats = ImportStats::default();
        for record in records {
            match self.upsert_record(record)? {
                RecordUpsert::Inserted => stats.inserted += 1,
                RecordUpsert::Superseded => stats.superseded += 1,
                RecordUpsert::KeptExisting => stats.kept_existing += 1,
            }
        }
        Ok(stats)
    }

    /// List records for a processor scope (None = all processors),
    /// optionally bounded to a month range, ordered by month then rowid
    pub fn list_records(
        &self,
        scope: Option<Processor>,
        start_month: Option<&str>,
        end_month: Option<&str>,
    ) -> Result<Vec<CanonicalRecord>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            "SELECT processor, month, merchant_id, merchant_name, branch_id, figures
             FROM records WHERE 1=1",
        );
        let mut bindings: Vec<String> = Vec::new();

        if let Some(processor) = scope {
            sql.push_str(" AND processor = ?");
            bindings.push(processor.as_str().to_string());
        }
        if let Some(start) = start_month {
            sql.push_str(" AND month >= ?");
            bindings.push(start.to_string());
        }
        if let Some(end) = end_month {
            sql.push_str(" AND month <= ?");
            bindings.push(end.to_string());
        }
        sql.push_str(" ORDER BY month, id");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (processor, month, merchant_id, merchant_name, branch_id, figures) = row?;
            let processor: Processor = processor
                .parse()
                .map_err(Error::InvalidData)?;
            let figures: Figures = serde_json::from_str(&figures)?;
            records.push(CanonicalRecord {
                processor,
                month,
                merchant_id,
                merchant_name,
                branch_id,
                figures,
            });
        }
        Ok(records)
    }

    /// Distinct months present for a scope, ascending
    pub fn distinct_months(&self, scope: Option<Processor>) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let (sql, binding) = match scope {
            Some(p) => (
                "SELECT DISTINCT month FROM records WHERE processor = ? ORDER BY month",
                Some(p.as_str().to_string()),
            ),
            None => ("SELECT DISTINCT month FROM records ORDER BY month", None),
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(binding.iter()), |row| {
            row.get::<_, String>(0)
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Record count and month span per processor, for status displays
    pub fn processor_summary(&self) -> Result<Vec<(Processor, i64, String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT processor, COUNT(*), MIN(month), MAX(month)
             FROM records GROUP BY processor ORDER BY processor",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut summary = Vec::new();
        for row in rows {
            let (processor, count, first, last) = row?;
            let processor: Processor = processor
                .parse()
                .map_err(Error::InvalidData)?;
            summary.push((processor, count, first, last));
        }
        Ok(summary)
    }
}
