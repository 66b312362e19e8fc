use crate::base::storeerror::StoreError;

#[test]
fn test_json_error_maps_to_invalid_data() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let converted = StoreError::from(err);
    assert!(matches!(converted, StoreError::InvalidCookieData { .. }));
    assert!(!converted.is_store_failure());
}

#[test]
fn test_store_failure_classification() {
    assert!(StoreError::backend("connection reset").is_store_failure());
    assert!(StoreError::ClientUnavailable.is_store_failure());
    assert!(StoreError::connect_failed("refused").is_store_failure());
    assert!(!StoreError::MissingDomainOrPath.is_store_failure());
    assert!(!StoreError::CookiePublicSuffix.is_store_failure());
}

#[test]
fn test_display_includes_message() {
    let err = StoreError::backend("READONLY You can't write against a read only replica.");
    assert_eq!(
        err.to_string(),
        "Key-value store error: READONLY You can't write against a read only replica."
    );
    assert_eq!(
        StoreError::MissingDomainOrPath.to_string(),
        "Domain and path must be specified"
    );
}
