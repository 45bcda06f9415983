//! Volunteer post handlers.
//!
//! ```text
//! GET    /all-volunteer-post?category=X | ?email=X
//! GET    /all-volunteer-post/{id}
//! POST   /all-volunteer-post
//! PATCH  /all-volunteer-post/{id}
//! DELETE /all-volunteer-post/{id}
//! PATCH  /all-volunteer-post/increment/{id}
//! PATCH  /all-volunteer-post/decrement/{id}
//! ```
//!
//! Public listing and fetch stay unguarded; every mutation requires the
//! session guard, and owner-only mutations additionally pass the ownership
//! policy against the stored `organizer_email`. The counter endpoints are the
//! deliberate exception: any authenticated caller may adjust capacity, since
//! volunteers adjust foreign posts when requests are accepted or withdrawn.

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::domain::volunteering::{collections, fields};
use crate::domain::{Document, Error, Filter, UpdateReport};
use crate::inbound::http::error::store_failure;
use crate::inbound::http::identity::{self, SessionIdentity};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_document_id};
use crate::inbound::http::ApiResult;

/// Ownership check for a stored post.
///
/// Records without an `organizer_email` cannot be claimed by anyone; only
/// counter seeding creates such stubs, and they stay immutable through the
/// generic update and delete paths.
fn require_post_owner(record: &Document, session: &SessionIdentity) -> Result<(), Error> {
    match record.get_str(fields::ORGANIZER_EMAIL) {
        Some(owner) => session.require_match(owner),
        None => Err(Error::forbidden("Forbidden")),
    }
}

/// Recognised list filters; anything else is ignored (empty filter).
#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    /// Public category filter.
    pub category: Option<String>,
    /// Owner filter; requires the session guard and the ownership policy.
    pub email: Option<String>,
}

/// List volunteer posts, newest first.
///
/// The `email` variant is the "my posts" listing: it authenticates the caller
/// and denies the request before any store access when the filter does not
/// match the session identity.
#[utoipa::path(
    get,
    path = "/all-volunteer-post",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("email" = Option<String>, Query, description = "Filter by owning organizer (requires session)")
    ),
    responses(
        (status = 200, description = "Matching posts, newest first"),
        (status = 401, description = "Owner filter without a valid session"),
        (status = 403, description = "Owner filter for a different identity")
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/all-volunteer-post")]
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<Vec<Document>>> {
    // Category takes precedence when both filters are supplied, so a public
    // category listing never trips the owner guard by accident.
    let filter = if let Some(category) = query.category.as_deref() {
        Filter::field_eq(fields::CATEGORY, json!(category))
    } else if let Some(email) = query.email.as_deref() {
        identity::resolve(&req)?.require_match(email)?;
        Filter::field_eq(fields::ORGANIZER_EMAIL, json!(email))
    } else {
        Filter::empty()
    };
    let records = state
        .store
        .list(collections::POSTS, &filter)
        .await
        .map_err(store_failure)?;
    Ok(web::Json(records))
}

/// Fetch a single post by identifier.
#[utoipa::path(
    get,
    path = "/all-volunteer-post/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "The post"),
        (status = 400, description = "Malformed identifier"),
        (status = 404, description = "No such post")
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/all-volunteer-post/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Document>> {
    let id = parse_document_id(&path)?;
    let record = state
        .store
        .get(collections::POSTS, &id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| Error::not_found("volunteer post not found"))?;
    Ok(web::Json(record))
}

/// Publish a volunteer post owned by the caller.
#[utoipa::path(
    post,
    path = "/all-volunteer-post",
    responses(
        (status = 200, description = "The stored post, including its identifier"),
        (status = 400, description = "Missing owner or malformed capacity"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Body owner differs from the session identity")
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/all-volunteer-post")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    payload: web::Json<Document>,
) -> ApiResult<HttpResponse> {
    let document = payload.into_inner();
    let organizer = document
        .get_str(fields::ORGANIZER_EMAIL)
        .ok_or_else(|| missing_field_error(fields::ORGANIZER_EMAIL))?;
    session.require_match(organizer)?;

    let needed = document
        .get(fields::VOLUNTEERS_NEEDED)
        .ok_or_else(|| missing_field_error(fields::VOLUNTEERS_NEEDED))?;
    if needed.as_u64().is_none() {
        return Err(Error::invalid_request(
            "volunteersNeeded must be a non-negative integer",
        )
        .with_details(json!({
            "field": fields::VOLUNTEERS_NEEDED,
            "code": "invalid_counter",
        })));
    }

    let stored = state
        .store
        .insert(collections::POSTS, document)
        .await
        .map_err(store_failure)?;
    Ok(HttpResponse::Ok().json(stored))
}

/// Partially update a post owned by the caller.
///
/// Upsert semantics are preserved from the repository contract: a missing
/// identifier creates a record from exactly the supplied fields, which must
/// then name the caller as owner. The capacity counter is excluded from this
/// path entirely.
#[utoipa::path(
    patch,
    path = "/all-volunteer-post/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "Update report"),
        (status = 400, description = "Malformed identifier, counter overwrite attempt, or upsert without an owner"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller does not own the post")
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/all-volunteer-post/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> ApiResult<web::Json<UpdateReport>> {
    let id = parse_document_id(&path)?;
    let changes = payload.into_inner();
    if changes.contains(fields::VOLUNTEERS_NEEDED) {
        return Err(Error::invalid_request(
            "volunteersNeeded changes only through the increment and decrement endpoints",
        )
        .with_details(json!({
            "field": fields::VOLUNTEERS_NEEDED,
            "code": "counter_field_readonly",
        })));
    }

    match state
        .store
        .get(collections::POSTS, &id)
        .await
        .map_err(store_failure)?
    {
        Some(existing) => require_post_owner(&existing, &session)?,
        None => {
            // Upserting a new record: it must name the caller as owner, so no
            // ownerless post ever enters the collection through this path.
            let claimed = changes
                .get_str(fields::ORGANIZER_EMAIL)
                .ok_or_else(|| missing_field_error(fields::ORGANIZER_EMAIL))?;
            session.require_match(claimed)?;
        }
    }

    let report = state
        .store
        .update(collections::POSTS, &id, changes)
        .await
        .map_err(store_failure)?;
    Ok(web::Json(report))
}

/// Delete a post owned by the caller.
///
/// Deleting an unknown identifier reports zero records and succeeds. Linked
/// requests are not cascaded; any left behind are logged.
#[utoipa::path(
    delete,
    path = "/all-volunteer-post/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "Delete report"),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller does not own the post")
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/all-volunteer-post/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(&path)?;
    if let Some(existing) = state
        .store
        .get(collections::POSTS, &id)
        .await
        .map_err(store_failure)?
    {
        require_post_owner(&existing, &session)?;
    }

    let report = state
        .store
        .delete(collections::POSTS, &id)
        .await
        .map_err(store_failure)?;

    let linked = state
        .store
        .list(
            collections::REQUESTS,
            &Filter::field_eq(fields::POST_ID, json!(id.as_str())),
        )
        .await
        .map_err(store_failure)?;
    if !linked.is_empty() {
        warn!(post_id = %id, count = linked.len(), "post deleted with requests still linked");
    }

    Ok(HttpResponse::Ok().json(report))
}

async fn adjust_capacity(
    state: &HttpState,
    raw_id: &str,
    delta: i64,
) -> ApiResult<web::Json<UpdateReport>> {
    let id = parse_document_id(raw_id)?;
    let report = state
        .store
        .adjust_counter(collections::POSTS, &id, fields::VOLUNTEERS_NEEDED, delta)
        .await
        .map_err(store_failure)?;
    Ok(web::Json(report))
}

/// Increase a post's open capacity by one (request withdrawn or rejected).
#[utoipa::path(
    patch,
    path = "/all-volunteer-post/increment/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "Update report"),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "No valid session")
    ),
    tags = ["posts"],
    operation_id = "incrementVolunteersNeeded"
)]
#[patch("/all-volunteer-post/increment/{id}")]
pub async fn increment_volunteers(
    state: web::Data<HttpState>,
    _session: SessionIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<UpdateReport>> {
    adjust_capacity(&state, &path, 1).await
}

/// Decrease a post's open capacity by one (request accepted).
#[utoipa::path(
    patch,
    path = "/all-volunteer-post/decrement/{id}",
    params(("id" = String, Path, description = "24-hex record identifier")),
    responses(
        (status = 200, description = "Update report"),
        (status = 400, description = "Malformed identifier"),
        (status = 401, description = "No valid session")
    ),
    tags = ["posts"],
    operation_id = "decrementVolunteersNeeded"
)]
#[patch("/all-volunteer-post/decrement/{id}")]
pub async fn decrement_volunteers(
    state: web::Data<HttpState>,
    _session: SessionIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<UpdateReport>> {
    adjust_capacity(&state, &path, -1).await
}
