//! [`SqliteStore`], the SQLite implementation of [`PoolStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use cabana_core::{
  access::{AccessFilter, AccessRecord, NewAccess},
  config::{PoolConfig, PoolConfigPatch},
  person::DepartmentCode,
  registration::{NewRegistration, RegistrationEntry},
  store::PoolStore,
};

use crate::{
  Error, Result,
  encode::{
    ACCESS_COLUMNS, REGISTRATION_COLUMNS, RawAccess, RawRegistration, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
  tx,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A pool ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted and every
/// clone talks to the same database thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "opened pool store");
    Ok(store)
  }

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
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PoolStore impl ──────────────────────────────────────────────────────────

impl PoolStore for SqliteStore {
  type Error = Error;

  // ── Configuration ─────────────────────────────────────────────────────────

  async fn load_config(&self) -> Result<PoolConfig> {
    self.conn.call(|conn| Ok(tx::read_config(conn))).await?
  }

  async fn init_config(&self, config: PoolConfig) -> Result<PoolConfig> {
    self
      .conn
      .call(move |conn| Ok(tx::init_config(conn, &config)))
      .await?
  }

  async fn update_config(
    &self,
    patch: PoolConfigPatch,
    at: DateTime<Utc>,
  ) -> Result<PoolConfig> {
    self
      .conn
      .call(move |conn| Ok(tx::update_config(conn, &patch, at)))
      .await?
  }

  // ── Access records ────────────────────────────────────────────────────────

  async fn open_access(&self, input: NewAccess) -> Result<AccessRecord> {
    let raw = self
      .conn
      .call(move |conn| Ok(tx::open_access(conn, &input)))
      .await??;
    raw.into_record()
  }

  async fn close_access(&self, id: Uuid, at: DateTime<Utc>) -> Result<AccessRecord> {
    let raw = self
      .conn
      .call(move |conn| Ok(tx::close_access(conn, id, at)))
      .await??;
    raw.into_record()
  }

  async fn get_access(&self, id: Uuid) -> Result<Option<AccessRecord>> {
    let raw = self
      .conn
      .call(move |conn| Ok(tx::get_access(conn, id)))
      .await??;
    raw.map(RawAccess::into_record).transpose()
  }

  async fn list_accesses<'a>(
    &'a self,
    filter: &'a AccessFilter,
  ) -> Result<Vec<AccessRecord>> {
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<String> = vec![];
    if let Some(department) = &filter.department {
      conds.push("department_code = ?");
      args.push(department.to_string());
    }
    if let Some(status) = filter.status {
      conds.push("status = ?");
      args.push(status.as_ref().to_owned());
    }
    if let Some(since) = filter.entered_since {
      conds.push("entry_time >= ?");
      args.push(encode_dt(since));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT {ACCESS_COLUMNS} FROM accesses
       {where_clause}
       ORDER BY entry_time DESC, rowid DESC"
    );

    let raws: Vec<RawAccess> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawAccess::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccess::into_record).collect()
  }

  // ── Guest roster ──────────────────────────────────────────────────────────

  async fn add_registration(
    &self,
    input: NewRegistration,
    created_at: DateTime<Utc>,
  ) -> Result<RegistrationEntry> {
    let raw = RawRegistration::from_new(Uuid::new_v4(), input, created_at);
    let row = raw.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO registrations ({REGISTRATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          rusqlite::params![
            row.registration_id,
            row.first_name,
            row.last_name,
            row.document_number,
            row.guest_type,
            row.department_code,
            row.registered_by,
            row.created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    raw.into_entry()
  }

  async fn get_registration(&self, id: Uuid) -> Result<Option<RegistrationEntry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRegistration> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {REGISTRATION_COLUMNS} FROM registrations
               WHERE registration_id = ?1"
            ),
            rusqlite::params![id_str],
            RawRegistration::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRegistration::into_entry).transpose()
  }

  async fn list_registrations(
    &self,
    department: Option<DepartmentCode>,
  ) -> Result<Vec<RegistrationEntry>> {
    let department = department.map(|d| d.to_string());

    let raws: Vec<RawRegistration> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REGISTRATION_COLUMNS} FROM registrations
           WHERE ?1 IS NULL OR department_code = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![department], RawRegistration::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegistration::into_entry).collect()
  }

  async fn remove_registration(&self, id: Uuid) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(tx::remove_registration(conn, id)))
      .await?
  }
}
