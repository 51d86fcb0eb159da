//! Shared fakes for configuration integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cas_client_config::{UrlResolver, WebContext};
use cas_client_validation::{Assertion, ValidationBackend, ValidationError, ValidationRequest};

pub const LOGIN_URL: &str = "https://sso.example.org/cas/login";
pub const PREFIX_URL: &str = "https://sso.example.org/cas/";
pub const REST_URL: &str = "https://sso.example.org/cas/v1/tickets";
pub const SERVICE_URL: &str = "https://app.example.org/protected";

/// Request context with a fixed URL and parameters.
#[derive(Debug)]
pub struct FakeContext {
    pub url: String,
    pub method: String,
    pub parameters: HashMap<String, String>,
    pub session: Option<String>,
}

impl FakeContext {
    pub fn new() -> Self {
        Self {
            url: "https://app.example.org/callback?client_name=CasClient".to_string(),
            method: "GET".to_string(),
            parameters: HashMap::new(),
            session: Some("SESSION-1".to_string()),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }
}

impl WebContext for FakeContext {
    fn request_url(&self) -> String {
        self.url.clone()
    }

    fn request_method(&self) -> String {
        self.method.clone()
    }

    fn request_parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    fn session_id(&self) -> Option<String> {
        self.session.clone()
    }

    fn destroy_session(&self) -> bool {
        false
    }

    fn destroy_session_by_id(&self, _session_id: &str) -> bool {
        false
    }
}

/// Identity resolver counting its calls.
#[derive(Debug, Default)]
pub struct CountingResolver {
    pub calls: AtomicUsize,
}

impl CountingResolver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UrlResolver for CountingResolver {
    fn compute(&self, url: &str, _context: &dyn WebContext) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        url.to_string()
    }
}

/// Backend answering with a fixed assertion and recording requests.
#[derive(Debug)]
pub struct ScriptedBackend {
    assertion: Assertion,
    pub requests: Mutex<Vec<ValidationRequest>>,
}

impl ScriptedBackend {
    pub fn answering(assertion: Assertion) -> Arc<Self> {
        Arc::new(Self {
            assertion,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> ValidationRequest {
        self.requests
            .lock()
            .expect("request log lock should work")
            .last()
            .cloned()
            .expect("backend should have been called")
    }
}

impl ValidationBackend for ScriptedBackend {
    fn exchange(&self, request: &ValidationRequest) -> Result<Assertion, ValidationError> {
        self.requests
            .lock()
            .expect("request log lock should work")
            .push(request.clone());
        Ok(self.assertion.clone())
    }
}
