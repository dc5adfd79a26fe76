use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store-assigned identifier, immutable once assigned.
pub type Id = i64;

/// Read-only reference data; there is no write API for categories.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct Category {
    pub id: Id,
    pub name: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Id,
    pub job_title: String,
    pub category: String,
    pub deadline: String,
    pub description: String,
    pub minimum_price: f64,
    pub maximum_price: f64,
    // Optional because a PUT-upsert can create a job row without an owner;
    // jobs created through POST /jobs always carry one.
    pub employer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub job_title: String,
    pub category: String,
    pub deadline: String,
    pub description: String,
    pub minimum_price: f64,
    pub maximum_price: f64,
    pub employer_email: String,
}

/// The six fields PUT /jobs/{id} replaces. `employerEmail` is deliberately
/// absent: ownership never changes through the update form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJob {
    pub job_title: String,
    pub category: String,
    pub deadline: String,
    pub description: String,
    pub minimum_price: f64,
    pub maximum_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Id,
    pub job_id: Option<Id>,
    pub job_title: Option<String>,
    pub bidder_email: String,
    pub price: Option<f64>,
    pub deadline: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub job_id: Option<Id>,
    pub job_title: Option<String>,
    pub bidder_email: String,
    pub price: Option<f64>,
    pub deadline: Option<String>,
    #[serde(default = "default_bid_status")]
    pub status: String,
}

fn default_bid_status() -> String {
    "pending".to_string()
}

/// Lifecycle transition for a bid: only `status` is mutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BidStatusUpdate {
    pub status: String,
}

/// Fields a bid listing may be sorted by. Anything else is rejected at the
/// request boundary with a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidSortField {
    Status,
    Price,
    Deadline,
    JobTitle,
}

impl BidSortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "status" => Some(Self::Status),
            "price" => Some(Self::Price),
            "deadline" => Some(Self::Deadline),
            "jobTitle" => Some(Self::JobTitle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BidSort {
    pub field: BidSortField,
    pub descending: bool,
}

impl Default for BidSort {
    fn default() -> Self {
        Self { field: BidSortField::Status, descending: false }
    }
}

/// Shape of an update/upsert acknowledgement, mirroring what the previous
/// document-store driver reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}
