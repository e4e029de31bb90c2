//! Identity of the caller, as asserted by the fronting layer.
//!
//! Authentication happens upstream; this crate only reads the
//! `x-department-code` and `x-role` headers it forwards.

use axum::{extract::FromRequestParts, http::request::Parts};
use cabana_core::{access::AccessRecord, person::DepartmentCode};

use crate::error::ApiError;

pub const DEPARTMENT_HEADER: &str = "x-department-code";
pub const ROLE_HEADER: &str = "x-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Staff,
  Owner,
}

/// Who is calling. A missing role header means [`Role::Owner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
  pub role:       Role,
  pub department: Option<DepartmentCode>,
}

impl Requester {
  pub fn is_staff(&self) -> bool { self.role == Role::Staff }

  /// Staff act for every department; owners only for their own.
  pub fn acts_for(&self, department: &DepartmentCode) -> bool {
    self.is_staff() || self.department.as_ref() == Some(department)
  }

  pub fn ensure_acts_for(&self, department: &DepartmentCode) -> Result<(), ApiError> {
    if self.acts_for(department) {
      Ok(())
    } else {
      Err(ApiError::Forbidden(format!(
        "not allowed to act for department {department}"
      )))
    }
  }

  pub fn ensure_staff(&self) -> Result<(), ApiError> {
    if self.is_staff() {
      Ok(())
    } else {
      Err(ApiError::Forbidden("staff role required".into()))
    }
  }

  pub fn can_close(&self, record: &AccessRecord) -> bool {
    cabana_core::access::can_close(record, self.department.as_ref(), self.is_staff())
  }

  /// The caller's own department, required for owner-scoped operations.
  pub fn own_department(&self) -> Result<&DepartmentCode, ApiError> {
    self
      .department
      .as_ref()
      .ok_or_else(|| ApiError::BadRequest(format!("{DEPARTMENT_HEADER} header is required")))
  }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
  parts
    .headers
    .get(name)
    .map(|v| {
      v.to_str()
        .map_err(|_| ApiError::BadRequest(format!("{name} header is not valid text")))
    })
    .transpose()
}

impl<S: Send + Sync> FromRequestParts<S> for Requester {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let role = match header(parts, ROLE_HEADER)?.map(str::trim) {
      None | Some("owner") => Role::Owner,
      Some("staff") => Role::Staff,
      Some(other) => {
        return Err(ApiError::BadRequest(format!("unknown role {other:?}")));
      }
    };
    let department = header(parts, DEPARTMENT_HEADER)?
      .map(DepartmentCode::parse)
      .transpose()?;
    Ok(Requester { role, department })
  }
}
