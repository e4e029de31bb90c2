//! Handlers for `/pool/stats` and `/admin/pool-config`.

use axum::{Json, extract::State};
use cabana_core::{
  config::{PoolConfig, PoolConfigPatch},
  ledger::AccessLedger,
  occupancy::PoolStats,
  store::PoolStore,
};

use crate::{
  error::{ApiError, JsonBody},
  requester::Requester,
};

/// `GET /pool/stats`
pub async fn stats<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
) -> Result<Json<PoolStats>, ApiError> {
  Ok(Json(ledger.stats().await?))
}

/// `GET /admin/pool-config`
pub async fn get_config<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
) -> Result<Json<PoolConfig>, ApiError> {
  Ok(Json(ledger.config().await?))
}

/// `PUT /admin/pool-config`: staff only. Absent fields keep their value.
pub async fn update_config<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  JsonBody(patch): JsonBody<PoolConfigPatch>,
) -> Result<Json<PoolConfig>, ApiError> {
  requester.ensure_staff()?;
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no configuration fields given".into()));
  }
  Ok(Json(ledger.update_config(patch).await?))
}
