//! Shared fakes for validation integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use cas_client_validation::{
    Assertion, ProxyGrantingTicketStorage, ValidationBackend, ValidationError, ValidationRequest,
};

/// Backend answering every request with a fixed outcome and recording it.
#[derive(Debug)]
pub struct ScriptedBackend {
    outcome: Result<Assertion, ValidationError>,
    pub requests: Mutex<Vec<ValidationRequest>>,
}

impl ScriptedBackend {
    pub fn answering(assertion: Assertion) -> Self {
        Self {
            outcome: Ok(assertion),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ValidationError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> ValidationRequest {
        self.requests
            .lock()
            .expect("request log lock should work")
            .last()
            .cloned()
            .expect("backend should have been called")
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("request log lock should work").len()
    }
}

impl ValidationBackend for ScriptedBackend {
    fn exchange(&self, request: &ValidationRequest) -> Result<Assertion, ValidationError> {
        self.requests
            .lock()
            .expect("request log lock should work")
            .push(request.clone());
        self.outcome.clone()
    }
}

/// PGT storage over a plain map.
#[derive(Debug, Default)]
pub struct MapStorage {
    pub entries: Mutex<HashMap<String, String>>,
}

impl ProxyGrantingTicketStorage for MapStorage {
    fn save(&self, proxy_granting_ticket_iou: &str, proxy_granting_ticket: &str) {
        self.entries
            .lock()
            .expect("storage lock should work")
            .insert(
                proxy_granting_ticket_iou.to_string(),
                proxy_granting_ticket.to_string(),
            );
    }

    fn retrieve(&self, proxy_granting_ticket_iou: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("storage lock should work")
            .get(proxy_granting_ticket_iou)
            .cloned()
    }

    fn clean_up(&self) {}
}
