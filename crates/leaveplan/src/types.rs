use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::AppConfig;
use crate::db::PlannerDb;
use crate::error::PlannerError;
use crate::ocr::OcrClient;
use crate::planner::LeavePlanner;

/// User id assumed when a request does not name one.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Shared state handed to every endpoint.
pub struct PlannerState {
    pub config: AppConfig,
    pub db: PlannerDb,
    pub ocr: OcrClient,
    pub planner: LeavePlanner,
    /// One lock per user so uploads for the same user apply in order.
    /// Entries only live while someone holds or waits for them.
    pub(crate) upload_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PlannerState {
    pub fn new(config: AppConfig) -> Result<Self, PlannerError> {
        let db = PlannerDb::open(&config.database.path)?;
        let ocr = OcrClient::new(config.ocr.clone())?;
        let planner = LeavePlanner::new(config.planner.clone());
        Ok(Self {
            config,
            db,
            ocr,
            planner,
            upload_locks: DashMap::new(),
        })
    }

    /// Waits for exclusive access to `user_id`'s stored data.
    pub async fn lock_user(&self, user_id: &str) -> UserLock<'_> {
        let lock = self
            .upload_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Built before waiting so a cancelled request still cleans up.
        let mut held = UserLock {
            locks: &self.upload_locks,
            user_id: user_id.to_string(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }
}

/// Held while a request mutates one user's data. Dropping it releases the
/// lock and forgets the user's entry once nobody else is waiting on it.
pub struct UserLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Blank or missing ids fall back to [`DEFAULT_USER_ID`].
pub fn resolve_user_id(user_id: Option<&str>) -> String {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_USER_ID.to_string(),
    }
}
