//! Handlers for `/pool/accesses` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/pool/accesses` | Optional `?departmentCode`, `?status=active\|completed` |
//! | `GET`   | `/pool/accesses/active` | Active records with time remaining and `canClose` |
//! | `POST`  | `/pool/accesses` | Body: [`NewAccessBody`]; returns 201 |
//! | `GET`   | `/pool/accesses/{id}` | 404 if not found |
//! | `PATCH` | `/pool/accesses/{id}/exit` | 403 unless the caller may close the record |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cabana_core::{
  access::{AccessFilter, AccessRecord, AccessStatus},
  expiry::{self, TimeRemaining},
  ledger::AccessLedger,
  person::DepartmentCode,
  store::PoolStore,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
  error::{ApiError, JsonBody, PathParam, QueryParams},
  requester::Requester,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub department_code: Option<DepartmentCode>,
  pub status:          Option<AccessStatus>,
}

/// `GET /pool/accesses[?departmentCode=..][&status=..]`
pub async fn list<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<AccessRecord>>, ApiError> {
  let filter = AccessFilter {
    department: params.department_code,
    status: params.status,
    ..Default::default()
  };
  Ok(Json(ledger.list(&filter).await?))
}

/// An active record as shown on the occupancy board.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAccessView {
  #[serde(flatten)]
  pub record:         AccessRecord,
  pub time_remaining: TimeRemaining,
  /// Human-readable form of `time_remaining`.
  pub remaining_text: String,
  pub can_close:      bool,
}

/// `GET /pool/accesses/active`
pub async fn list_active<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
) -> Result<Json<Vec<ActiveAccessView>>, ApiError> {
  let now = ledger.now();
  let views = ledger
    .list_active()
    .await?
    .into_iter()
    .map(|record| {
      let time_remaining = expiry::remaining(now, record.expected_exit_time);
      ActiveAccessView {
        can_close: requester.can_close(&record),
        remaining_text: time_remaining.to_string(),
        time_remaining,
        record,
      }
    })
    .collect();
  Ok(Json(views))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
  Owner,
  Guest,
}

/// JSON body accepted by `POST /pool/accesses`.
///
/// For guests, `personId` is the roster entry id and everything else about
/// the person comes from the roster. For owners, `departmentCode` defaults to
/// the caller's department.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccessBody {
  pub person_type:     PersonType,
  pub person_id:       String,
  pub estimated_hours: u32,
  pub person_name:     Option<String>,
  pub department_code: Option<DepartmentCode>,
}

/// `POST /pool/accesses`
pub async fn create<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  JsonBody(body): JsonBody<NewAccessBody>,
) -> Result<impl IntoResponse, ApiError> {
  let record = match body.person_type {
    PersonType::Guest => {
      let guest_id = Uuid::parse_str(body.person_id.trim())
        .map_err(|_| ApiError::BadRequest(format!("invalid guest id {:?}", body.person_id)))?;
      let entry = ledger.directory().get(guest_id).await?;
      requester.ensure_acts_for(&entry.department_code)?;
      ledger
        .register_guest_access(entry.id, body.estimated_hours)
        .await?
    }
    PersonType::Owner => {
      let department_code = match body.department_code {
        Some(code) => code,
        None => requester.own_department()?.clone(),
      };
      requester.ensure_acts_for(&department_code)?;
      ledger
        .register_owner_access(
          &body.person_id,
          department_code,
          body.person_name,
          body.estimated_hours,
        )
        .await?
    }
  };
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /pool/accesses/{id}`
pub async fn get_one<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<AccessRecord>, ApiError> {
  Ok(Json(ledger.get(id).await?))
}

// ─── Exit ─────────────────────────────────────────────────────────────────────

/// `PATCH /pool/accesses/{id}/exit`
pub async fn exit<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<AccessRecord>, ApiError> {
  let record = ledger.get(id).await?;
  if !requester.can_close(&record) {
    warn!(access_id = %id, department = %record.department_code, "exit refused");
    return Err(ApiError::Forbidden(format!(
      "only staff or department {} may close this access",
      record.department_code
    )));
  }
  Ok(Json(ledger.mark_exit(id).await?))
}
