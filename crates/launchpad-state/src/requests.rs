use launchpad_core::error::LaunchpadError;
use launchpad_core::request::Request;
use launchpad_core::types::{LaunchId, RequestId};

use crate::db::StateDb;

/// Pending requests and the per-chain request counters.
///
/// Only pending requests live here: settlement removes the record, so a
/// request id that is absent was either never issued or already settled.
pub struct RequestStore<'a> {
    db: &'a StateDb,
}

impl<'a> RequestStore<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    /// Draw the next request id of `launch_id`. Ids are never reused.
    pub fn next_request_id(&self, launch_id: LaunchId) -> Result<RequestId, LaunchpadError> {
        self.db.next_request_id(launch_id)
    }

    pub fn save_request(&self, request: &Request) -> Result<(), LaunchpadError> {
        self.db.put_request(request)
    }

    pub fn get_request(&self, launch_id: LaunchId, request_id: RequestId) -> Result<Option<Request>, LaunchpadError> {
        self.db.get_request(launch_id, request_id)
    }

    /// Fails with `RequestNotFound` when no pending request has that id.
    pub fn pending(&self, launch_id: LaunchId, request_id: RequestId) -> Result<Request, LaunchpadError> {
        self.get_request(launch_id, request_id)?
            .ok_or(LaunchpadError::RequestNotFound { launch_id, request_id })
    }

    pub fn remove_request(&self, launch_id: LaunchId, request_id: RequestId) -> Result<(), LaunchpadError> {
        if !self.db.remove_request(launch_id, request_id)? {
            return Err(LaunchpadError::RequestNotFound { launch_id, request_id });
        }
        Ok(())
    }

    pub fn list_requests(&self, launch_id: LaunchId) -> Result<Vec<Request>, LaunchpadError> {
        self.db.iter_requests(launch_id)
    }

    pub fn list_all_requests(&self) -> Result<Vec<Request>, LaunchpadError> {
        self.db.iter_all_requests()
    }

    /// The id the next request on `launch_id` will receive.
    pub fn request_counter(&self, launch_id: LaunchId) -> Result<u64, LaunchpadError> {
        self.db.request_counter(launch_id)
    }
}
