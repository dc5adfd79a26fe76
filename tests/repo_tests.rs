#![cfg(feature = "inmem-store")]

use bidboard::models::{BidSort, BidSortField, NewBid, NewJob, UpdateJob};
use bidboard::repo::inmem::InMemRepo;
// Bring trait method namespaces into scope so calls on InMemRepo resolve.
use bidboard::repo::{BidRepo, CategoryRepo, JobRepo};
use serial_test::serial;

/// Helper that returns a fresh repository backed by a throwaway snapshot dir.
fn repo() -> InMemRepo {
    std::env::set_var("BIDBOARD_DATA_DIR", tempfile::tempdir().unwrap().path());
    InMemRepo::new()
}

fn sample_job(employer: &str) -> NewJob {
    NewJob {
        job_title: "Build a landing page".into(),
        category: "Web Development".into(),
        deadline: "2026-09-30".into(),
        description: "Single-page site with a contact form".into(),
        minimum_price: 100.0,
        maximum_price: 250.0,
        employer_email: employer.into(),
    }
}

fn sample_bid(bidder: &str, price: f64, status: &str) -> NewBid {
    NewBid {
        job_id: None,
        job_title: Some("Build a landing page".into()),
        bidder_email: bidder.into(),
        price: Some(price),
        deadline: Some("2026-09-15".into()),
        status: status.into(),
    }
}

#[tokio::test]
#[serial]
async fn default_categories_are_seeded() {
    let r = repo();
    let cats = r.list_categories().await.unwrap();
    assert_eq!(cats.len(), 3);
    assert_eq!(cats[0].name, "Web Development");
    assert!(cats.iter().all(|c| c.label.is_some()));
}

#[tokio::test]
#[serial]
async fn job_crud_roundtrip() {
    let r = repo();

    assert!(r.list_jobs().await.unwrap().is_empty());

    let job = r.insert_job(sample_job("a@x.com")).await.unwrap();
    assert_eq!(job.employer_email.as_deref(), Some("a@x.com"));

    // fetch by id returns the inserted fields
    let fetched = r.get_job(job.id).await.unwrap().expect("job present");
    assert_eq!(fetched.job_title, job.job_title);
    assert_eq!(fetched.minimum_price, 100.0);

    // absent id is Ok(None), not an error
    assert!(r.get_job(9999).await.unwrap().is_none());

    // employer filter
    r.insert_job(sample_job("b@x.com")).await.unwrap();
    let mine = r.list_jobs_by_employer("a@x.com").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, job.id);

    // delete reports a count and is idempotent
    assert_eq!(r.delete_job(job.id).await.unwrap().deleted_count, 1);
    assert_eq!(r.delete_job(job.id).await.unwrap().deleted_count, 0);
}

#[tokio::test]
#[serial]
async fn upsert_replaces_fields_but_keeps_owner() {
    let r = repo();
    let job = r.insert_job(sample_job("a@x.com")).await.unwrap();

    let upd = UpdateJob {
        job_title: "Redesign the landing page".into(),
        category: "Graphics Design".into(),
        deadline: "2026-10-15".into(),
        description: "New brand colours".into(),
        minimum_price: 150.0,
        maximum_price: 300.0,
    };
    let outcome = r.upsert_job(job.id, upd).await.unwrap();
    assert_eq!(outcome.matched_count, 1);
    assert_eq!(outcome.modified_count, 1);
    assert!(outcome.upserted_id.is_none());

    let after = r.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(after.job_title, "Redesign the landing page");
    assert_eq!(after.maximum_price, 300.0);
    // ownership is not part of the update form and must survive
    assert_eq!(after.employer_email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
#[serial]
async fn upsert_inserts_when_id_is_absent() {
    let r = repo();
    let upd = UpdateJob {
        job_title: "Ghost job".into(),
        category: "Digital Marketing".into(),
        deadline: "2026-12-01".into(),
        description: "Created straight through PUT".into(),
        minimum_price: 50.0,
        maximum_price: 80.0,
    };
    let outcome = r.upsert_job(424242, upd).await.unwrap();
    assert_eq!(outcome.matched_count, 0);
    assert_eq!(outcome.upserted_id, Some(424242));

    let ghost = r.get_job(424242).await.unwrap().unwrap();
    assert_eq!(ghost.job_title, "Ghost job");
    // the upserted row has no owner
    assert!(ghost.employer_email.is_none());
}

#[tokio::test]
#[serial]
async fn bid_sorting_and_status_patch() {
    let r = repo();

    r.insert_bid(sample_bid("x@x.com", 200.0, "pending")).await.unwrap();
    let middle = r.insert_bid(sample_bid("y@x.com", 120.0, "in-progress")).await.unwrap();
    r.insert_bid(sample_bid("z@x.com", 180.0, "complete")).await.unwrap();

    // default: status ascending
    let by_status = r.list_bids(BidSort::default()).await.unwrap();
    let statuses: Vec<_> = by_status.iter().map(|b| b.status.as_str()).collect();
    assert_eq!(statuses, vec!["complete", "in-progress", "pending"]);

    // price descending
    let by_price = r
        .list_bids(BidSort { field: BidSortField::Price, descending: true })
        .await
        .unwrap();
    let prices: Vec<_> = by_price.iter().map(|b| b.price.unwrap()).collect();
    assert_eq!(prices, vec![200.0, 180.0, 120.0]);

    // patching status leaves every other field alone
    let outcome = r.set_bid_status(middle.id, "complete").await.unwrap();
    assert_eq!(outcome.matched_count, 1);
    let after = r
        .list_bids(BidSort::default())
        .await
        .unwrap()
        .into_iter()
        .find(|b| b.id == middle.id)
        .unwrap();
    assert_eq!(after.status, "complete");
    assert_eq!(after.bidder_email, "y@x.com");
    assert_eq!(after.price, Some(120.0));
    assert_eq!(after.deadline.as_deref(), Some("2026-09-15"));

    // patching an unknown id matches nothing but is not an error
    let missed = r.set_bid_status(777, "complete").await.unwrap();
    assert_eq!(missed.matched_count, 0);
}
