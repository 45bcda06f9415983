//! Volunteer request handlers.
//!
//! ```text
//! POST   /requests
//! GET    /requests?v_email=X | ?organizer_email=X
//! PATCH  /requests/{id}
//! DELETE /requests/{id}
//! ```
//!
//! Every route requires a session. Requests sit between two parties, so the
//! record-level mutations accept either side: the volunteer who filed the
//! request or the organizer named on it.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::volunteering::{fields, collections, RequestStatus};
use crate::domain::{Document, Error, Filter, UpdateReport};
use crate::inbound::http::error::store_failure;
use crate::inbound::http::identity::SessionIdentity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_document_id};
use crate::inbound::http::ApiResult;

/// List filters for the request collection.
#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    /// Volunteer-side filter.
    pub v_email: Option<String>,
    /// Organizer-side filter.
    pub organizer_email: Option<String>,
}

/// Status transition body for `PATCH /requests/{id}`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StatusUpdate {
    /// Identity the caller claims; must match the session.
    pub email: String,
    /// New status for the request.
    pub status: String,
}

fn involves(record: &Document, email: &str) -> bool {
    [fields::V_EMAIL, fields::ORGANIZER_EMAIL]
        .iter()
        .any(|field| record.get_str(field) == Some(email))
}

fn require_involvement(record: &Document, session: &SessionIdentity) -> Result<(), Error> {
    if involves(record, session.email()) {
        Ok(())
    } else {
        Err(Error::forbidden("Forbidden"))
    }
}

fn parse_status(raw: &str) -> Result<RequestStatus, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("status must be pending, accepted or rejected").with_details(
            json!({
                "field": fields::STATUS,
                "value": raw,
                "code": "invalid_status",
            }),
        )
    })
}

/// File a volunteering request on behalf of the caller.
#[utoipa::path(
    post,
    path = "/requests",
    responses(
        (status = 200, description = "The stored request, including its identifier"),
        (status = 400, description = "Missing volunteer email or malformed status"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Body volunteer differs from the session identity")
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    payload: web::Json<Document>,
) -> ApiResult<HttpResponse> {
    let mut document = payload.into_inner();
    let volunteer = document
        .get_str(fields::V_EMAIL)
        .ok_or_else(|| missing_field_error(fields::V_EMAIL))?;
    session.require_match(volunteer)?;

    let status = match document.get_str(fields::STATUS) {
        Some(raw) => parse_status(raw)?,
        None => RequestStatus::Pending,
    };
    document.set(fields::STATUS, json!(status.as_str()));

    let stored = state
        .store
        .insert(collections::REQUESTS, document)
        .await
        .map_err(store_failure)?;
    Ok(HttpResponse::Ok().json(stored))
}

/// List requests visible to the caller.
///
/// With no filter the listing defaults to the caller's own volunteer-side
/// requests; it never enumerates the whole collection.
#[utoipa::path(
    get,
    path = "/requests",
    params(
        ("v_email" = Option<String>, Query, description = "Filter by volunteer email"),
        ("organizer_email" = Option<String>, Query, description = "Filter by organizer email")
    ),
    responses(
        (status = 200, description = "Matching requests, newest first"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Filter for a different identity")
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    query: web::Query<RequestListQuery>,
) -> ApiResult<web::Json<Vec<Document>>> {
    let filter = if let Some(v_email) = query.v_email.as_deref() {
        session.require_match(v_email)?;
        Filter::field_eq(fields::V_EMAIL, json!(v_email))
    } else if let Some(organizer) = query.organizer_email.as_deref() {
        session.require_match(organizer)?;
        Filter::field_eq(fields::ORGANIZER_EMAIL, json!(organizer))
    } else {
        Filter::field_eq(fields::V_EMAIL, json!(session.email()))
    };
    let records = state
        .store
        .list(collections::REQUESTS, &filter)
        .await
        .map_err(store_failure)?;
    Ok(web::Json(records))
}

/// Move a request through its status lifecycle.
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Update report"),
        (status = 400, description = "Malformed identifier or unknown status"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller is not a party to the request"),
        (status = 404, description = "No such request")
    ),
    tags = ["requests"],
    operation_id = "updateRequestStatus"
)]
#[patch("/requests/{id}")]
pub async fn update_request_status(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    path: web::Path<String>,
    payload: web::Json<StatusUpdate>,
) -> ApiResult<web::Json<UpdateReport>> {
    let id = parse_document_id(&path)?;
    let status = parse_status(&payload.status)?;
    session.require_match(&payload.email)?;

    let existing = state
        .store
        .get(collections::REQUESTS, &id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| Error::not_found("volunteer request not found"))?;
    require_involvement(&existing, &session)?;

    let mut changes = Document::default();
    changes.set(fields::STATUS, json!(status.as_str()));
    let report = state
        .store
        .update(collections::REQUESTS, &id, changes)
        .await
        .map_err(store_failure)?;
    Ok(web::Json(report))
}

/// Withdraw or discard a request.
///
/// Deleting an unknown identifier reports zero records and succeeds.
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "Delete report"),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller is not a party to the request")
    ),
    tags = ["requests"],
    operation_id = "deleteRequest"
)]
#[delete("/requests/{id}")]
pub async fn delete_request(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(&path)?;
    if let Some(existing) = state
        .store
        .get(collections::REQUESTS, &id)
        .await
        .map_err(store_failure)?
    {
        require_involvement(&existing, &session)?;
    }

    let report = state
        .store
        .delete(collections::REQUESTS, &id)
        .await
        .map_err(store_failure)?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(v_email: &str, organizer: &str) -> Document {
        let mut doc = Document::default();
        doc.set(fields::V_EMAIL, json!(v_email));
        doc.set(fields::ORGANIZER_EMAIL, json!(organizer));
        doc
    }

    #[rstest]
    #[case("vol@x.com", true)]
    #[case("org@x.com", true)]
    #[case("other@x.com", false)]
    fn involvement_accepts_either_party(#[case] email: &str, #[case] expected: bool) {
        let doc = record("vol@x.com", "org@x.com");
        assert_eq!(involves(&doc, email), expected);
    }

    #[rstest]
    #[case("pending", true)]
    #[case("accepted", true)]
    #[case("rejected", true)]
    #[case("done", false)]
    #[case("", false)]
    fn status_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_status(raw).is_ok(), ok);
    }
}
