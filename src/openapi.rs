use crate::models::{
    Bid, BidStatusUpdate, Category, DeleteOutcome, Job, NewBid, NewJob, UpdateJob, UpdateOutcome,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::issue_session,
        crate::routes::sign_out,
        crate::routes::list_categories,
        crate::routes::create_job,
        crate::routes::list_jobs,
        crate::routes::my_posted_jobs,
        crate::routes::get_job,
        crate::routes::replace_job,
        crate::routes::delete_job,
        crate::routes::create_bid,
        crate::routes::list_bids,
        crate::routes::update_bid_status,
    ),
    components(schemas(
        Category, Job, NewJob, UpdateJob, Bid, NewBid, BidStatusUpdate,
        UpdateOutcome, DeleteOutcome, crate::routes::SessionRequest,
    )),
    tags(
        (name = "auth", description = "Session token issuance and sign-out"),
        (name = "jobs", description = "Job posting operations"),
        (name = "bids", description = "Bid operations"),
    )
)]
pub struct ApiDoc;
