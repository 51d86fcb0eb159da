//! Integration tests for proxy-chain trust policy on proxy validators.

mod common;

use std::sync::Arc;

use cas_client_core::{ProxyChain, ProxyList};
use cas_client_validation::{
    Assertion, Cas20ProxyTicketValidator, Cas30ProxyTicketValidator, Cas30ServiceTicketValidator,
    CasServiceValidator, ProxyChainPolicy, TicketValidator, ValidationError,
};
use common::ScriptedBackend;

const PREFIX: &str = "https://sso.example.org/cas/";
const SERVICE: &str = "https://app.example.org/";

fn proxied_assertion(proxies: &[&str]) -> Assertion {
    let mut assertion = Assertion::new("jdoe");
    assertion.proxies = proxies.iter().map(|proxy| proxy.to_string()).collect();
    assertion
}

#[test]
fn proxy_chain_policy_tests_rejects_unlisted_chain() {
    let backend = Arc::new(ScriptedBackend::answering(proxied_assertion(&[
        "https://rogue.example.org/cb",
    ])));
    let mut validator = Cas30ProxyTicketValidator::new(PREFIX);
    validator.set_backend(backend.clone());
    validator.set_allowed_proxy_chains(ProxyList::new(vec![ProxyChain::new([
        "https://proxy.example.org/cb",
    ])]));

    let error = validator.validate("PT-1", SERVICE).unwrap_err();
    assert_eq!(
        error,
        ValidationError::UnauthorizedProxyChain(vec!["https://rogue.example.org/cb".to_string()])
    );
    assert_eq!(backend.last_request().url.path(), "/cas/p3/proxyValidate");
}

#[test]
fn proxy_chain_policy_tests_accepts_listed_chain_and_direct_tickets() {
    let mut validator = Cas20ProxyTicketValidator::new(PREFIX);
    validator.set_allowed_proxy_chains(ProxyList::new(vec![ProxyChain::new([
        "https://proxy.example.org/*",
    ])]));

    validator.set_backend(Arc::new(ScriptedBackend::answering(proxied_assertion(&[
        "https://proxy.example.org/cb",
    ]))));
    assert!(validator.validate("PT-2", SERVICE).is_ok());

    validator.set_backend(Arc::new(ScriptedBackend::answering(proxied_assertion(&[]))));
    assert!(validator.validate("ST-2", SERVICE).is_ok());
}

#[test]
fn proxy_chain_policy_tests_accept_any_proxy_bypasses_list() {
    let mut validator = Cas20ProxyTicketValidator::new(PREFIX);
    validator.set_accept_any_proxy(true);
    validator.set_backend(Arc::new(ScriptedBackend::answering(proxied_assertion(&[
        "https://anything.example.org/cb",
    ]))));

    assert!(validator.accept_any_proxy());
    assert!(validator.allowed_proxy_chains().is_empty());
    assert_eq!(
        validator
            .validate("PT-3", SERVICE)
            .expect("any proxy should be accepted")
            .proxies,
        vec!["https://anything.example.org/cb".to_string()]
    );
}

#[test]
fn proxy_chain_policy_tests_service_validator_does_not_check_chains() {
    let mut validator = Cas30ServiceTicketValidator::new(PREFIX);
    validator.set_backend(Arc::new(ScriptedBackend::answering(proxied_assertion(&[
        "https://rogue.example.org/cb",
    ]))));
    assert!(validator.validate("ST-4", SERVICE).is_ok());
}
