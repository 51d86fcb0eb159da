//! Integration tests for backend delegation, PGT resolution and SAML windows.

mod common;

use std::sync::Arc;

use cas_client_core::Protocol;
use cas_client_validation::{
    Assertion, Cas10TicketValidator, Cas20ServiceTicketValidator, CasServiceValidator,
    ProxyCallbackTarget, ProxyGrantingTicketStorage, Saml11TicketValidator, TicketValidator,
    ValidationError,
};
use common::{MapStorage, ScriptedBackend};

const PREFIX: &str = "https://sso.example.org/cas/";
const SERVICE: &str = "https://app.example.org/";

#[test]
fn validation_flow_tests_without_backend_reports_unavailable() {
    let validator = Cas10TicketValidator::new(PREFIX);
    assert_eq!(
        validator.validate("ST-1", SERVICE),
        Err(ValidationError::BackendUnavailable)
    );
}

#[test]
fn validation_flow_tests_backend_errors_propagate_unchanged() {
    let mut validator = Cas10TicketValidator::new(PREFIX);
    validator.set_encoding("ISO-8859-1");
    let backend = Arc::new(ScriptedBackend::failing(ValidationError::Backend(
        "INVALID_TICKET".to_string(),
    )));
    validator.set_backend(backend.clone());

    assert_eq!(
        validator.validate("ST-1", SERVICE),
        Err(ValidationError::Backend("INVALID_TICKET".to_string()))
    );
    let request = backend.last_request();
    assert_eq!(request.protocol, Protocol::Cas10);
    assert_eq!(request.encoding, "ISO-8859-1");
    assert_eq!(request.url.path(), "/cas/validate");
}

#[test]
fn validation_flow_tests_resolves_pgt_from_storage() {
    let storage = Arc::new(MapStorage::default());
    storage.save("PGTIOU-9", "PGT-9");

    let mut assertion = Assertion::new("jdoe");
    assertion.proxy_granting_ticket_iou = Some("PGTIOU-9".to_string());

    let mut validator = Cas20ServiceTicketValidator::new(PREFIX);
    validator.set_proxy_callback_url("https://app.example.org/callback");
    validator.set_proxy_granting_ticket_storage(storage);
    let backend = Arc::new(ScriptedBackend::answering(assertion));
    validator.set_backend(backend.clone());

    let validated = validator.validate("ST-9", SERVICE).expect("ticket should validate");
    assert_eq!(validated.proxy_granting_ticket.as_deref(), Some("PGT-9"));
    assert!(
        backend
            .last_request()
            .url
            .query_pairs()
            .any(|(name, value)| name == "pgtUrl" && value == "https://app.example.org/callback")
    );
}

#[test]
fn validation_flow_tests_unknown_iou_leaves_pgt_empty() {
    let mut assertion = Assertion::new("jdoe");
    assertion.proxy_granting_ticket_iou = Some("PGTIOU-missing".to_string());

    let mut validator = Cas20ServiceTicketValidator::new(PREFIX);
    validator.set_proxy_granting_ticket_storage(Arc::new(MapStorage::default()));
    validator.set_backend(Arc::new(ScriptedBackend::answering(assertion)));

    let validated = validator.validate("ST-10", SERVICE).expect("ticket should validate");
    assert!(validated.proxy_granting_ticket.is_none());
}

#[test]
fn validation_flow_tests_saml_window_honors_tolerance() {
    let mut assertion = Assertion::new("jdoe");
    assertion.valid_from_ms = Some(10_000);
    assertion.valid_until_ms = Some(20_000);

    let mut validator = Saml11TicketValidator::new(PREFIX);
    validator.set_backend(Arc::new(ScriptedBackend::answering(assertion)));
    assert_eq!(validator.tolerance(), 1_000);

    assert!(validator.validate_at("ST-11", SERVICE, 9_000).is_ok());
    assert!(validator.validate_at("ST-11", SERVICE, 20_999).is_ok());
    assert!(matches!(
        validator.validate_at("ST-11", SERVICE, 8_999),
        Err(ValidationError::AssertionOutsideValidity { .. })
    ));
    assert!(matches!(
        validator.validate_at("ST-11", SERVICE, 21_000),
        Err(ValidationError::AssertionOutsideValidity { .. })
    ));
}

#[test]
fn validation_flow_tests_assertion_decodes_from_camel_case_json() {
    let assertion: Assertion = serde_json::from_str(
        r#"{"principal":"jdoe","attributes":{"mail":["jdoe@example.org"]},"proxyGrantingTicketIou":"PGTIOU-1"}"#,
    )
    .expect("assertion should decode");

    assert_eq!(assertion.principal, "jdoe");
    assert_eq!(assertion.attributes["mail"], vec!["jdoe@example.org".to_string()]);
    assert_eq!(assertion.proxy_granting_ticket_iou.as_deref(), Some("PGTIOU-1"));
    assert!(assertion.proxies.is_empty());
}
