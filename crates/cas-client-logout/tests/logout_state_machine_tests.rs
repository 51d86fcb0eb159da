//! Integration tests for default logout handler transitions.

mod common;

use cas_client_core::{LOGOUT_REQUEST_PARAMETER, WebContext};
use cas_client_logout::{
    CasLogoutHandler, DefaultCasLogoutHandler, extract_session_index, is_back_channel_logout,
    is_front_channel_logout,
};
use common::RecordingContext;

#[test]
fn logout_state_machine_tests_records_then_destroys_via_back_channel() {
    let handler = DefaultCasLogoutHandler::new();
    handler.record_session(&RecordingContext::with_session("JSESSION-1"), "ST-1");
    assert_eq!(handler.session_for_ticket("ST-1").as_deref(), Some("JSESSION-1"));

    let logout_request = "<samlp:LogoutRequest><samlp:SessionIndex>ST-1</samlp:SessionIndex></samlp:LogoutRequest>";
    let server = RecordingContext::post(LOGOUT_REQUEST_PARAMETER, logout_request);
    assert!(is_back_channel_logout(&server));
    assert!(!is_front_channel_logout(&server));

    let ticket = extract_session_index(logout_request).expect("session index should be present");
    handler.destroy_session_back(&server, &ticket);

    assert_eq!(server.destroyed(), vec!["JSESSION-1".to_string()]);
    assert!(handler.session_for_ticket("ST-1").is_none());
    assert!(handler.is_empty());
}

#[test]
fn logout_state_machine_tests_front_channel_destroys_current_session() {
    let handler = DefaultCasLogoutHandler::new();
    let browser = RecordingContext::with_session("JSESSION-2");
    handler.record_session(&browser, "ST-2");

    handler.destroy_session_front(&browser, "ST-2");

    assert_eq!(browser.destroyed(), vec!["JSESSION-2".to_string()]);
    assert!(browser.session_id().is_none());
    assert!(handler.session_for_ticket("ST-2").is_none());
}

#[test]
fn logout_state_machine_tests_unknown_ticket_is_ignored() {
    let handler = DefaultCasLogoutHandler::new();
    let server = RecordingContext::post(LOGOUT_REQUEST_PARAMETER, "<SessionIndex>ST-x</SessionIndex>");
    handler.destroy_session_back(&server, "ST-x");
    assert!(server.destroyed().is_empty());
}

#[test]
fn logout_state_machine_tests_record_without_session_is_noop() {
    let handler = DefaultCasLogoutHandler::new();
    handler.record_session(&RecordingContext::default(), "ST-3");
    assert!(handler.is_empty());
}

#[test]
fn logout_state_machine_tests_renew_rekeys_ticket_to_new_session() {
    let handler = DefaultCasLogoutHandler::new();
    handler.record_session(&RecordingContext::with_session("OLD"), "ST-4");
    handler.record_session(&RecordingContext::with_session("OTHER"), "ST-5");

    handler.renew_session("OLD", &RecordingContext::with_session("NEW"));

    assert_eq!(handler.session_for_ticket("ST-4").as_deref(), Some("NEW"));
    assert_eq!(handler.session_for_ticket("ST-5").as_deref(), Some("OTHER"));

    let server = RecordingContext::post(LOGOUT_REQUEST_PARAMETER, "");
    handler.destroy_session_back(&server, "ST-4");
    assert_eq!(server.destroyed(), vec!["NEW".to_string()]);
}
