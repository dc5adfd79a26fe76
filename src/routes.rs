use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::{self, Auth};
use crate::error::ApiError;
use crate::models::*;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health))
        .service(web::resource("/jwt").route(web::post().to(issue_session)))
        .service(web::resource("/signout").route(web::post().to(sign_out)))
        .service(web::resource("/category").route(web::get().to(list_categories)))
        .service(
            web::resource("/jobs")
                .route(web::get().to(list_jobs))
                .route(web::post().to(create_job)),
        )
        // registered before /jobs/{id} so the literal segment wins
        .service(web::resource("/jobs/my-posted-jobs").route(web::get().to(my_posted_jobs)))
        .service(
            web::resource("/jobs/{id}")
                .route(web::get().to(get_job))
                .route(web::put().to(replace_job))
                .route(web::delete().to(delete_job)),
        )
        .service(
            web::resource("/bids")
                .route(web::get().to(list_bids))
                .route(web::post().to(create_bid)),
        )
        .service(web::resource("/bids/{id}").route(web::patch().to(update_bid_status)));
}

#[derive(Clone)]
pub struct AppState { pub repo: Arc<dyn Repo> }

async fn health() -> &'static str {
    "bidboard server is running"
}

/// Login payload; anything beyond the email claim is ignored.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SessionRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/jwt",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session cookie issued"),
        (status = 500, description = "Token signing failed")
    )
)]
pub async fn issue_session(payload: web::Json<SessionRequest>) -> Result<HttpResponse, ApiError> {
    let token = auth::issue_token(&payload.email).map_err(|e| {
        log::error!("token signing failed: {e}");
        ApiError::Internal
    })?;
    Ok(HttpResponse::Ok()
        .cookie(auth::session_cookie(token))
        .json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/signout",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn sign_out() -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok()
        .cookie(auth::removal_cookie())
        .json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/category",
    responses((status = 200, description = "List categories", body = [Category]))
)]
pub async fn list_categories(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let categories = data.repo.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = NewJob,
    responses((status = 201, description = "Job created", body = Job))
)]
pub async fn create_job(
    data: web::Data<AppState>,
    payload: web::Json<NewJob>,
) -> Result<HttpResponse, ApiError> {
    let job = data.repo.insert_job(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

#[utoipa::path(
    get,
    path = "/jobs",
    responses((status = 200, description = "List all jobs", body = [Job]))
)]
pub async fn list_jobs(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let jobs = data.repo.list_jobs().await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/jobs/my-posted-jobs",
    params(EmailQuery),
    responses(
        (status = 200, description = "Jobs posted by the caller", body = [Job]),
        (status = 401, description = "Missing or invalid session token"),
        (status = 403, description = "Query email does not match the session identity")
    )
)]
pub async fn my_posted_jobs(
    auth: Auth,
    data: web::Data<AppState>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.email != auth.0.email {
        return Err(ApiError::Forbidden);
    }
    let jobs = data.repo.list_jobs_by_employer(&query.email).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(("id" = Id, Path, description = "Job id")),
    responses((status = 200, description = "The job, or null when absent", body = Job))
)]
pub async fn get_job(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    // Absent ids are not an error here: the response body is simply null.
    let job = data.repo.get_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    request_body = UpdateJob,
    params(("id" = Id, Path, description = "Job id")),
    responses((status = 200, description = "Upsert acknowledgement", body = UpdateOutcome))
)]
pub async fn replace_job(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<UpdateJob>,
) -> Result<HttpResponse, ApiError> {
    let outcome = data
        .repo
        .upsert_job(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(("id" = Id, Path, description = "Job id")),
    responses((status = 200, description = "Delete acknowledgement", body = DeleteOutcome))
)]
pub async fn delete_job(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let outcome = data.repo.delete_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    post,
    path = "/bids",
    request_body = NewBid,
    responses((status = 201, description = "Bid created", body = Bid))
)]
pub async fn create_bid(
    data: web::Data<AppState>,
    payload: web::Json<NewBid>,
) -> Result<HttpResponse, ApiError> {
    let bid = data.repo.insert_bid(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(bid))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BidListQuery {
    pub email: String,
    pub sort_field: Option<String>,
    pub sort_order: Option<i8>,
}

#[utoipa::path(
    get,
    path = "/bids",
    params(BidListQuery),
    responses(
        (status = 200, description = "All bids, sorted", body = [Bid]),
        (status = 400, description = "Unknown sort field"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 403, description = "Query email does not match the session identity")
    )
)]
pub async fn list_bids(
    auth: Auth,
    data: web::Data<AppState>,
    query: web::Query<BidListQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.email != auth.0.email {
        return Err(ApiError::Forbidden);
    }
    let field = match query.sort_field.as_deref() {
        Some(name) => BidSortField::parse(name).ok_or(ApiError::BadRequest)?,
        None => BidSortField::Status,
    };
    let sort = BidSort { field, descending: query.sort_order == Some(-1) };
    // The guard above checks identity only; the listing itself is not
    // filtered by email (see DESIGN.md).
    let bids = data.repo.list_bids(sort).await?;
    Ok(HttpResponse::Ok().json(bids))
}

#[utoipa::path(
    patch,
    path = "/bids/{id}",
    request_body = BidStatusUpdate,
    params(("id" = Id, Path, description = "Bid id")),
    responses((status = 200, description = "Update acknowledgement", body = UpdateOutcome))
)]
pub async fn update_bid_status(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<BidStatusUpdate>,
) -> Result<HttpResponse, ApiError> {
    let outcome = data
        .repo
        .set_bid_status(path.into_inner(), &payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
