//! Integration tests for proxy allow-list decoding and membership.

use cas_client_core::{ProxyChain, ProxyList};

#[test]
fn proxy_list_tests_decodes_nested_url_arrays() {
    let list: ProxyList = serde_json::from_str(
        r#"[["https://proxy1.example.org/cb"], ["https://edge.example.org/*", "https://proxy2.example.org/cb"]]"#,
    )
    .expect("proxy list should decode");

    assert_eq!(list.len(), 2);
    assert!(list.contains(&["https://proxy1.example.org/cb".to_string()]));
    assert!(list.contains(&[
        "https://edge.example.org/east".to_string(),
        "https://proxy2.example.org/cb".to_string(),
    ]));
    assert!(!list.contains(&["https://proxy2.example.org/cb".to_string()]));
}

#[test]
fn proxy_list_tests_empty_list_accepts_nothing() {
    let list = ProxyList::default();
    assert!(list.is_empty());
    assert!(!list.contains(&["https://proxy1.example.org/cb".to_string()]));
    assert!(!list.contains(&[]));
}

#[test]
fn proxy_list_tests_renders_chains_in_order() {
    let list = ProxyList::new(vec![
        ProxyChain::new(["https://a.example.org"]),
        ProxyChain::new(["https://b.example.org", "https://c.example.org"]),
    ]);
    assert_eq!(
        list.to_string(),
        "[[https://a.example.org], [https://b.example.org, https://c.example.org]]"
    );
}
