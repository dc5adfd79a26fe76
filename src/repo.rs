use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("store failure: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

use async_trait::async_trait;

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
}

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn insert_job(&self, new: NewJob) -> RepoResult<Job>;
    async fn list_jobs(&self) -> RepoResult<Vec<Job>>;
    async fn list_jobs_by_employer(&self, email: &str) -> RepoResult<Vec<Job>>;
    /// A missing id is not an error; callers decide what an absent job means.
    async fn get_job(&self, id: Id) -> RepoResult<Option<Job>>;
    /// Replace the named fields, inserting a fresh row at `id` when absent.
    async fn upsert_job(&self, id: Id, upd: UpdateJob) -> RepoResult<UpdateOutcome>;
    async fn delete_job(&self, id: Id) -> RepoResult<DeleteOutcome>;
}

#[async_trait]
pub trait BidRepo: Send + Sync {
    async fn insert_bid(&self, new: NewBid) -> RepoResult<Bid>;
    async fn list_bids(&self, sort: BidSort) -> RepoResult<Vec<Bid>>;
    /// Sets only `status`; every other field on the bid is untouched.
    async fn set_bid_status(&self, id: Id, status: &str) -> RepoResult<UpdateOutcome>;
}

pub trait Repo: CategoryRepo + JobRepo + BidRepo {}

impl<T> Repo for T where T: CategoryRepo + JobRepo + BidRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, RwLock};

    const SNAPSHOT_PATH: &str = "data/state.json";

    /// Categories seeded into an empty store; deployments that want a
    /// different catalogue edit the snapshot or use the Postgres backend.
    const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
        ("Web Development", "web-development"),
        ("Graphics Design", "graphics-design"),
        ("Digital Marketing", "digital-marketing"),
    ];

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        categories: HashMap<Id, Category>,
        jobs: HashMap<Id, Job>,
        bids: HashMap<Id, Bid>,
        next_id: Id,
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn data_dir() -> PathBuf {
            std::env::var("BIDBOARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data"))
        }

        fn snapshot_path() -> PathBuf {
            if std::env::var("BIDBOARD_DATA_DIR").is_ok() {
                let mut p = Self::data_dir();
                p.push("state.json");
                p
            } else {
                PathBuf::from(SNAPSHOT_PATH)
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        tracing::info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        tracing::warn!(
                            "failed to parse snapshot '{}': {e}; starting empty",
                            path.display()
                        );
                        State::default()
                    }
                },
                Err(_) => State::default(),
            }
        }

        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(s) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, s) {
                    tracing::error!("failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            let snapshot_path = Self::snapshot_path();
            let mut state = Self::load_state_from(&snapshot_path);
            if state.categories.is_empty() {
                for (name, label) in DEFAULT_CATEGORIES {
                    state.next_id += 1;
                    let id = state.next_id;
                    state.categories.insert(
                        id,
                        Category {
                            id,
                            name: (*name).to_string(),
                            label: Some((*label).to_string()),
                        },
                    );
                }
            }
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    fn compare_bids(a: &Bid, b: &Bid, field: BidSortField) -> Ordering {
        match field {
            BidSortField::Status => a.status.cmp(&b.status),
            BidSortField::Price => a
                .price
                .partial_cmp(&b.price)
                .unwrap_or(Ordering::Equal),
            BidSortField::Deadline => a.deadline.cmp(&b.deadline),
            BidSortField::JobTitle => a.job_title.cmp(&b.job_title),
        }
    }

    #[async_trait]
    impl CategoryRepo for InMemRepo {
        async fn list_categories(&self) -> RepoResult<Vec<Category>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s.categories.values().cloned().collect();
            v.sort_by_key(|c| c.id);
            Ok(v)
        }
    }

    #[async_trait]
    impl JobRepo for InMemRepo {
        async fn insert_job(&self, new: NewJob) -> RepoResult<Job> {
            let mut s = self.state.write().unwrap();
            let id = Self::next_id(&mut s);
            let job = Job {
                id,
                job_title: new.job_title,
                category: new.category,
                deadline: new.deadline,
                description: new.description,
                minimum_price: new.minimum_price,
                maximum_price: new.maximum_price,
                employer_email: Some(new.employer_email),
            };
            s.jobs.insert(id, job.clone());
            drop(s); // release lock before persisting
            self.persist();
            Ok(job)
        }

        async fn list_jobs(&self) -> RepoResult<Vec<Job>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s.jobs.values().cloned().collect();
            v.sort_by_key(|j| j.id);
            Ok(v)
        }

        async fn list_jobs_by_employer(&self, email: &str) -> RepoResult<Vec<Job>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .jobs
                .values()
                .filter(|j| j.employer_email.as_deref() == Some(email))
                .cloned()
                .collect();
            v.sort_by_key(|j| j.id);
            Ok(v)
        }

        async fn get_job(&self, id: Id) -> RepoResult<Option<Job>> {
            let s = self.state.read().unwrap();
            Ok(s.jobs.get(&id).cloned())
        }

        async fn upsert_job(&self, id: Id, upd: UpdateJob) -> RepoResult<UpdateOutcome> {
            let mut s = self.state.write().unwrap();
            let outcome = if let Some(job) = s.jobs.get_mut(&id) {
                job.job_title = upd.job_title;
                job.category = upd.category;
                job.deadline = upd.deadline;
                job.description = upd.description;
                job.minimum_price = upd.minimum_price;
                job.maximum_price = upd.maximum_price;
                UpdateOutcome { matched_count: 1, modified_count: 1, upserted_id: None }
            } else {
                // Upsert inserts at the requested id; the row has no owner
                // because the update form never carries one.
                let job = Job {
                    id,
                    job_title: upd.job_title,
                    category: upd.category,
                    deadline: upd.deadline,
                    description: upd.description,
                    minimum_price: upd.minimum_price,
                    maximum_price: upd.maximum_price,
                    employer_email: None,
                };
                s.jobs.insert(id, job);
                if s.next_id < id {
                    s.next_id = id;
                }
                UpdateOutcome { matched_count: 0, modified_count: 0, upserted_id: Some(id) }
            };
            drop(s);
            self.persist();
            Ok(outcome)
        }

        async fn delete_job(&self, id: Id) -> RepoResult<DeleteOutcome> {
            let mut s = self.state.write().unwrap();
            let deleted = s.jobs.remove(&id).is_some();
            drop(s);
            if deleted {
                self.persist();
            }
            Ok(DeleteOutcome { deleted_count: deleted as u64 })
        }
    }

    #[async_trait]
    impl BidRepo for InMemRepo {
        async fn insert_bid(&self, new: NewBid) -> RepoResult<Bid> {
            let mut s = self.state.write().unwrap();
            let id = Self::next_id(&mut s);
            let bid = Bid {
                id,
                job_id: new.job_id,
                job_title: new.job_title,
                bidder_email: new.bidder_email,
                price: new.price,
                deadline: new.deadline,
                status: new.status,
            };
            s.bids.insert(id, bid.clone());
            drop(s);
            self.persist();
            Ok(bid)
        }

        async fn list_bids(&self, sort: BidSort) -> RepoResult<Vec<Bid>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s.bids.values().cloned().collect();
            v.sort_by(|a, b| {
                let ord = compare_bids(a, b, sort.field);
                if sort.descending { ord.reverse() } else { ord }
            });
            Ok(v)
        }

        async fn set_bid_status(&self, id: Id, status: &str) -> RepoResult<UpdateOutcome> {
            let mut s = self.state.write().unwrap();
            let outcome = match s.bids.get_mut(&id) {
                Some(bid) => {
                    bid.status = status.to_string();
                    UpdateOutcome { matched_count: 1, modified_count: 1, upserted_id: None }
                }
                None => UpdateOutcome { matched_count: 0, modified_count: 0, upserted_id: None },
            };
            drop(s);
            self.persist();
            Ok(outcome)
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres, Row};

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    fn internal(e: sqlx::Error) -> RepoError {
        tracing::error!("postgres error: {e}");
        RepoError::Internal(e.to_string())
    }

    impl BidSortField {
        fn column(self) -> &'static str {
            match self {
                BidSortField::Status => "status",
                BidSortField::Price => "price",
                BidSortField::Deadline => "deadline",
                BidSortField::JobTitle => "job_title",
            }
        }
    }

    #[async_trait]
    impl CategoryRepo for PgRepo {
        async fn list_categories(&self) -> RepoResult<Vec<Category>> {
            sqlx::query_as::<_, Category>("SELECT id, name, label FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(internal)
        }
    }

    #[async_trait]
    impl JobRepo for PgRepo {
        async fn insert_job(&self, new: NewJob) -> RepoResult<Job> {
            sqlx::query_as::<_, Job>(
                "INSERT INTO jobs (job_title, category, deadline, description, minimum_price, maximum_price, employer_email) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7) \
                 RETURNING id, job_title, category, deadline, description, minimum_price, maximum_price, employer_email",
            )
            .bind(&new.job_title)
            .bind(&new.category)
            .bind(&new.deadline)
            .bind(&new.description)
            .bind(new.minimum_price)
            .bind(new.maximum_price)
            .bind(&new.employer_email)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)
        }

        async fn list_jobs(&self) -> RepoResult<Vec<Job>> {
            sqlx::query_as::<_, Job>(
                "SELECT id, job_title, category, deadline, description, minimum_price, maximum_price, employer_email \
                 FROM jobs ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
        }

        async fn list_jobs_by_employer(&self, email: &str) -> RepoResult<Vec<Job>> {
            sqlx::query_as::<_, Job>(
                "SELECT id, job_title, category, deadline, description, minimum_price, maximum_price, employer_email \
                 FROM jobs WHERE employer_email = $1 ORDER BY id",
            )
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
        }

        async fn get_job(&self, id: Id) -> RepoResult<Option<Job>> {
            sqlx::query_as::<_, Job>(
                "SELECT id, job_title, category, deadline, description, minimum_price, maximum_price, employer_email \
                 FROM jobs WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)
        }

        async fn upsert_job(&self, id: Id, upd: UpdateJob) -> RepoResult<UpdateOutcome> {
            // xmax = 0 distinguishes a fresh insert from a conflict update.
            let row = sqlx::query(
                "INSERT INTO jobs (id, job_title, category, deadline, description, minimum_price, maximum_price) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7) \
                 ON CONFLICT (id) DO UPDATE SET \
                   job_title = EXCLUDED.job_title, category = EXCLUDED.category, \
                   deadline = EXCLUDED.deadline, description = EXCLUDED.description, \
                   minimum_price = EXCLUDED.minimum_price, maximum_price = EXCLUDED.maximum_price \
                 RETURNING (xmax = 0) AS inserted",
            )
            .bind(id)
            .bind(&upd.job_title)
            .bind(&upd.category)
            .bind(&upd.deadline)
            .bind(&upd.description)
            .bind(upd.minimum_price)
            .bind(upd.maximum_price)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
            let inserted: bool = row.get("inserted");
            Ok(if inserted {
                UpdateOutcome { matched_count: 0, modified_count: 0, upserted_id: Some(id) }
            } else {
                UpdateOutcome { matched_count: 1, modified_count: 1, upserted_id: None }
            })
        }

        async fn delete_job(&self, id: Id) -> RepoResult<DeleteOutcome> {
            let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            Ok(DeleteOutcome { deleted_count: res.rows_affected() })
        }
    }

    #[async_trait]
    impl BidRepo for PgRepo {
        async fn insert_bid(&self, new: NewBid) -> RepoResult<Bid> {
            sqlx::query_as::<_, Bid>(
                "INSERT INTO bids (job_id, job_title, bidder_email, price, deadline, status) \
                 VALUES ($1,$2,$3,$4,$5,$6) \
                 RETURNING id, job_id, job_title, bidder_email, price, deadline, status",
            )
            .bind(new.job_id)
            .bind(&new.job_title)
            .bind(&new.bidder_email)
            .bind(new.price)
            .bind(&new.deadline)
            .bind(&new.status)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)
        }

        async fn list_bids(&self, sort: BidSort) -> RepoResult<Vec<Bid>> {
            // Column name comes from a closed enum, never from the caller.
            let sql = format!(
                "SELECT id, job_id, job_title, bidder_email, price, deadline, status \
                 FROM bids ORDER BY {} {}",
                sort.field.column(),
                if sort.descending { "DESC" } else { "ASC" },
            );
            sqlx::query_as::<_, Bid>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)
        }

        async fn set_bid_status(&self, id: Id, status: &str) -> RepoResult<UpdateOutcome> {
            let res = sqlx::query("UPDATE bids SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            let n = res.rows_affected();
            Ok(UpdateOutcome { matched_count: n, modified_count: n, upserted_id: None })
        }
    }
}
