//! Shared web-context fake for logout integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use cas_client_core::WebContext;

/// Web context recording the sessions it was asked to destroy.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub method: String,
    pub parameters: HashMap<String, String>,
    pub session: Mutex<Option<String>>,
    pub destroyed: Mutex<Vec<String>>,
}

impl RecordingContext {
    pub fn with_session(session_id: &str) -> Self {
        Self {
            method: "GET".to_string(),
            session: Mutex::new(Some(session_id.to_string())),
            ..Self::default()
        }
    }

    pub fn post(parameter: &str, value: &str) -> Self {
        let mut context = Self {
            method: "POST".to_string(),
            ..Self::default()
        };
        context
            .parameters
            .insert(parameter.to_string(), value.to_string());
        context
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().expect("destroyed lock should work").clone()
    }
}

impl WebContext for RecordingContext {
    fn request_url(&self) -> String {
        "https://app.example.org/callback".to_string()
    }

    fn request_method(&self) -> String {
        self.method.clone()
    }

    fn request_parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    fn session_id(&self) -> Option<String> {
        self.session.lock().expect("session lock should work").clone()
    }

    fn destroy_session(&self) -> bool {
        let current = self.session.lock().expect("session lock should work").take();
        match current {
            Some(session_id) => {
                self.destroyed
                    .lock()
                    .expect("destroyed lock should work")
                    .push(session_id);
                true
            }
            None => false,
        }
    }

    fn destroy_session_by_id(&self, session_id: &str) -> bool {
        self.destroyed
            .lock()
            .expect("destroyed lock should work")
            .push(session_id.to_string());
        true
    }
}
