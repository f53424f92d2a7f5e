//! Server side of the sync engine.
//!
//! [`ApiRemote`] implements [`store::SyncRemote`] on top of the workout server
//! functions, so [`store::SyncEngine`] can push the local queue and pull the server
//! copy without knowing about HTTP.

use store::{SyncRemote, WorkoutDay};

pub struct ApiRemote;

impl SyncRemote for ApiRemote {
    async fn push_workout(&self, day: WorkoutDay) -> Result<WorkoutDay, String> {
        api::save_workout(day).await.map_err(|e| e.to_string())
    }

    async fn delete_workout(&self, id: &str) -> Result<(), String> {
        api::delete_workout(id.to_string())
            .await
            .map_err(|e| e.to_string())
    }

    async fn fetch_workouts(&self) -> Result<Vec<WorkoutDay>, String> {
        api::list_workouts().await.map_err(|e| e.to_string())
    }
}

/// What the header shows about synchronisation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncStatus {
    /// Days waiting for upload or deletion.
    pub pending: usize,
    pub syncing: bool,
    pub last_error: Option<String>,
    /// Milliseconds since the Unix epoch of the last complete pull.
    pub last_sync: Option<i64>,
    /// A sync was requested while one was running.
    pub rerun: bool,
}

impl SyncStatus {
    /// Claim the sync slot. When one is already running, remember to go again and
    /// return `false`.
    pub fn begin(&mut self) -> bool {
        if self.syncing {
            self.rerun = true;
            return false;
        }
        self.syncing = true;
        self.rerun = false;
        true
    }

    /// Record the outcome of a pass. Returns `true` when another pass was requested
    /// meanwhile; the slot then stays claimed for it.
    pub fn finish(&mut self, error: Option<String>, last_sync: Option<i64>) -> bool {
        self.last_error = error;
        self.last_sync = last_sync;
        if self.rerun {
            self.rerun = false;
            return true;
        }
        self.syncing = false;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_during_sync_runs_again() {
        let mut status = SyncStatus::default();
        assert!(status.begin());
        assert!(!status.begin());
        assert!(status.rerun);

        // The running pass picks the request up instead of dropping it
        assert!(status.finish(None, Some(1)));
        assert!(status.syncing);
        assert!(!status.finish(None, Some(2)));
        assert!(!status.syncing);
        assert_eq!(status.last_sync, Some(2));
    }

    #[test]
    fn test_single_pass_releases_slot() {
        let mut status = SyncStatus::default();
        assert!(status.begin());
        assert!(!status.finish(Some("offline".into()), None));
        assert!(!status.syncing);
        assert_eq!(status.last_error.as_deref(), Some("offline"));
        assert!(status.begin());
    }
}
