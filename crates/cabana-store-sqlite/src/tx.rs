//! Synchronous check-and-write operations, each run as one transaction on the
//! connection thread.
//!
//! Every function here opens a `BEGIN IMMEDIATE` transaction, so the write
//! lock is held from the first read to the commit. A refusal returns early,
//! which drops the transaction and rolls it back.

use cabana_core::{
  Error as PoolError,
  access::NewAccess,
  config::{PoolConfig, PoolConfigPatch},
  ledger::{AdmissionState, check_admission, check_exit, exit_time},
  person::PersonRef,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    ACCESS_COLUMNS, RawAccess, RawConfig, encode_dt, encode_uuid,
  },
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// The stored configuration, or the defaults if no row exists.
pub fn read_config(conn: &Connection) -> Result<PoolConfig> {
  let raw = conn
    .query_row(
      "SELECT max_capacity, max_hours_per_visit, opening_time, closing_time,
              is_active, updated_at
       FROM pool_config WHERE config_id = 1",
      [],
      RawConfig::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => raw.into_config(),
    None => Ok(PoolConfig::default()),
  }
}

fn write_config(conn: &Connection, config: &PoolConfig, replace: bool) -> Result<()> {
  let raw = RawConfig::from_config(config);
  let verb = if replace { "INSERT OR REPLACE" } else { "INSERT OR IGNORE" };
  conn.execute(
    &format!(
      "{verb} INTO pool_config (
         config_id, max_capacity, max_hours_per_visit,
         opening_time, closing_time, is_active, updated_at
       ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)"
    ),
    rusqlite::params![
      raw.max_capacity,
      raw.max_hours_per_visit,
      raw.opening_time,
      raw.closing_time,
      raw.is_active,
      raw.updated_at,
    ],
  )?;
  Ok(())
}

pub fn init_config(conn: &mut Connection, config: &PoolConfig) -> Result<PoolConfig> {
  config.validate()?;
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  write_config(&tx, config, false)?;
  let current = read_config(&tx)?;
  tx.commit()?;
  Ok(current)
}

pub fn update_config(
  conn: &mut Connection,
  patch: &PoolConfigPatch,
  at: DateTime<Utc>,
) -> Result<PoolConfig> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let next = read_config(&tx)?.apply(patch, at)?;
  write_config(&tx, &next, true)?;
  tx.commit()?;
  Ok(next)
}

// ─── Access records ──────────────────────────────────────────────────────────

fn select_access(conn: &Connection, id: &str) -> Result<Option<RawAccess>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {ACCESS_COLUMNS} FROM accesses WHERE access_id = ?1"),
        rusqlite::params![id],
        RawAccess::from_row,
      )
      .optional()?,
  )
}

pub fn get_access(conn: &Connection, id: Uuid) -> Result<Option<RawAccess>> {
  select_access(conn, &encode_uuid(id))
}

pub fn open_access(conn: &mut Connection, input: &NewAccess) -> Result<RawAccess> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if let PersonRef::Guest { id, department_code, guest_type } = &input.person {
    let roster: Option<(String, String)> = tx
      .query_row(
        "SELECT department_code, guest_type FROM registrations
         WHERE registration_id = ?1",
        rusqlite::params![encode_uuid(*id)],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?;
    let Some((roster_department, roster_type)) = roster else {
      return Err(PoolError::GuestNotFound(*id).into());
    };
    if roster_department != department_code.as_str()
      || roster_type != guest_type.as_ref()
    {
      return Err(
        PoolError::InvalidRegistration(format!(
          "guest {id} is registered as {roster_type} of {roster_department}"
        ))
        .into(),
      );
    }
  }

  let config = read_config(&tx)?;
  let active_count: u32 = tx.query_row(
    "SELECT COUNT(*) FROM accesses WHERE status = 'active'",
    [],
    |r| r.get(0),
  )?;
  let person_active = tx
    .query_row(
      "SELECT 1 FROM accesses WHERE person_id = ?1 AND status = 'active'",
      rusqlite::params![input.person.person_id()],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  check_admission(
    &config,
    AdmissionState { active_count, person_active },
    input,
  )?;

  let raw = RawAccess::from_new(Uuid::new_v4(), input);
  tx.execute(
    &format!(
      "INSERT INTO accesses ({ACCESS_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
    ),
    rusqlite::params![
      raw.access_id,
      raw.person_kind,
      raw.person_id,
      raw.guest_type,
      raw.person_name,
      raw.department_code,
      raw.entry_time,
      raw.estimated_hours,
      raw.expected_exit_time,
      raw.actual_exit_time,
      raw.status,
    ],
  )?;
  tx.commit()?;
  Ok(raw)
}

pub fn close_access(
  conn: &mut Connection,
  id: Uuid,
  at: DateTime<Utc>,
) -> Result<RawAccess> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let id_str = encode_uuid(id);

  let mut raw = select_access(&tx, &id_str)?.ok_or(PoolError::AccessNotFound(id))?;
  let record = raw.clone().into_record()?;
  check_exit(&record)?;

  raw.actual_exit_time = Some(encode_dt(exit_time(&record, at)));
  raw.status = "completed".to_owned();
  tx.execute(
    "UPDATE accesses SET actual_exit_time = ?1, status = ?2
     WHERE access_id = ?3 AND status = 'active'",
    rusqlite::params![raw.actual_exit_time, raw.status, id_str],
  )?;
  tx.commit()?;
  Ok(raw)
}

// ─── Guest roster ────────────────────────────────────────────────────────────

pub fn remove_registration(conn: &mut Connection, id: Uuid) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let id_str = encode_uuid(id);

  let exists = tx
    .query_row(
      "SELECT 1 FROM registrations WHERE registration_id = ?1",
      rusqlite::params![id_str],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !exists {
    return Err(PoolError::GuestNotFound(id).into());
  }

  let inside = tx
    .query_row(
      "SELECT 1 FROM accesses
       WHERE person_kind = 'guest' AND person_id = ?1 AND status = 'active'",
      rusqlite::params![id_str],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if inside {
    return Err(PoolError::HasActiveAccess(id).into());
  }

  tx.execute(
    "DELETE FROM registrations WHERE registration_id = ?1",
    rusqlite::params![id_str],
  )?;
  tx.commit()?;
  Ok(())
}
