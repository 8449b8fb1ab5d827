//! [`SqliteStore`] — the SQLite implementation of [`AlertStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use alerto_core::{
  alert::{Alert, AlertId},
  report::{AlertStatus, SosReport},
  store::{AlertQuery, AlertStore},
};

use crate::{
  Error, Result,
  encode::{RawAlert, decode_status, encode_status, encode_ts},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An alert store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Current status of a row, `None` when the id is unknown.
  async fn status_of(&self, id: AlertId) -> Result<Option<AlertStatus>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT status FROM alerts WHERE id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_status).transpose()
  }
}

// ─── AlertStore impl ─────────────────────────────────────────────────────────

impl AlertStore for SqliteStore {
  type Error = Error;

  async fn record_alert(&self, report: SosReport) -> Result<Alert> {
    let name = report.name.clone();
    let contact = report.contact.clone();
    let ts_ms = encode_ts(report.timestamp);
    let lat = report.lat;
    let lon = report.lon;
    let status_str = encode_status(report.status).to_owned();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO alerts (name, timestamp, lat, lon, contact, status)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![name, ts_ms, lat, lon, contact, status_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Alert {
      id,
      name: report.name,
      timestamp: report.timestamp,
      lat,
      lon,
      contact: report.contact,
      status: report.status,
    })
  }

  async fn get_alert(&self, id: AlertId) -> Result<Option<Alert>> {
    let raw: Option<RawAlert> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, timestamp, lat, lon, contact, status
               FROM alerts WHERE id = ?1",
              rusqlite::params![id],
              RawAlert::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAlert::into_alert).transpose()
  }

  async fn list_alerts(&self, query: AlertQuery) -> Result<Vec<Alert>> {
    let status_str = query.status.map(encode_status).map(str::to_owned);
    let contact_str = query.contact;
    // LIMIT -1 means unlimited in SQLite.
    let limit_val = query.limit.map(i64::from).unwrap_or(-1);
    let offset_val = query.offset.map(i64::from).unwrap_or(0);

    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; parameter numbering stays fixed.
        let mut conds: Vec<&'static str> = vec![];
        if status_str.is_some() {
          conds.push("status = ?1");
        }
        if contact_str.is_some() {
          conds.push("contact = ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT id, name, timestamp, lat, lon, contact, status
           FROM alerts
           {where_clause}
           ORDER BY timestamp DESC, id DESC
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              status_str.as_deref(),
              contact_str.as_deref(),
              limit_val,
              offset_val,
            ],
            RawAlert::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_alert).collect()
  }

  async fn resolve_alert(&self, id: AlertId) -> Result<Alert> {
    match self.status_of(id).await? {
      None => return Err(Error::AlertNotFound(id)),
      Some(AlertStatus::Resolved) => return Err(Error::AlreadyResolved(id)),
      Some(AlertStatus::Active) => {}
    }

    let resolved_str = encode_status(AlertStatus::Resolved).to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE alerts SET status = ?1 WHERE id = ?2",
          rusqlite::params![resolved_str, id],
        )?;
        Ok(())
      })
      .await?;

    self.get_alert(id).await?.ok_or(Error::AlertNotFound(id))
  }

  async fn delete_alert(&self, id: AlertId) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM alerts WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::AlertNotFound(id));
    }
    Ok(())
  }
}
