//! Handlers for `/pool/guests` endpoints.
//!
//! Owners see and manage only their own department's roster. Staff see every
//! department, optionally narrowed with `?departmentCode`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cabana_core::{
  ledger::AccessLedger,
  person::{DepartmentCode, GuestType},
  registration::{NewRegistration, RegistrationEntry},
  store::PoolStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::{ApiError, JsonBody, PathParam, QueryParams},
  requester::Requester,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub department_code: Option<DepartmentCode>,
}

/// `GET /pool/guests[?departmentCode=..]`
pub async fn list<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<RegistrationEntry>>, ApiError> {
  let directory = ledger.directory();
  let department = match params.department_code {
    Some(code) => Some(code),
    None if requester.is_staff() => None,
    None => Some(requester.own_department()?.clone()),
  };

  let entries = match department {
    Some(code) => {
      requester.ensure_acts_for(&code)?;
      directory.list_by_department(&code).await?
    }
    None => directory.list_all().await?,
  };
  Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGuestBody {
  pub first_name:      String,
  pub last_name:       String,
  pub document_number: Option<String>,
  pub guest_type:      GuestType,
  /// Defaults to the caller's department.
  pub department_code: Option<DepartmentCode>,
  /// Defaults to the department code.
  pub registered_by:   Option<String>,
}

/// `POST /pool/guests`
pub async fn create<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  JsonBody(body): JsonBody<NewGuestBody>,
) -> Result<impl IntoResponse, ApiError> {
  let department_code = match body.department_code {
    Some(code) => code,
    None => requester.own_department()?.clone(),
  };
  requester.ensure_acts_for(&department_code)?;

  let input = NewRegistration {
    first_name: body.first_name,
    last_name: body.last_name,
    document_number: body.document_number,
    guest_type: body.guest_type,
    registered_by: body
      .registered_by
      .unwrap_or_else(|| department_code.to_string()),
    department_code,
  };
  let entry = ledger.directory().register(input).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /pool/guests/{id}`: 409 while the guest is inside the pool.
pub async fn remove<S: PoolStore + 'static>(
  State(ledger): State<AccessLedger<S>>,
  requester: Requester,
  PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
  let directory = ledger.directory();
  let entry = directory.get(id).await?;
  requester.ensure_acts_for(&entry.department_code)?;
  directory.remove(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
