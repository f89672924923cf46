use serde_json::json;
use split_openfeature_provider::{
    ClientConfig, Error, ErrorCode, EvaluationContext, FeatureProvider, Reason, SplitProvider,
    TARGETING_KEY,
};

const SPLIT_FILE: &str = "tests/data/localhost.split";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn provider() -> SplitProvider {
    init();
    SplitProvider::from_config(ClientConfig::from_sdk_key("localhost").split_file(SPLIT_FILE))
        .unwrap()
}

fn context() -> EvaluationContext {
    [
        (TARGETING_KEY.to_owned(), "user-1".into()),
        ("plan".to_owned(), "enterprise".into()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn creates_provider_in_localhost_mode() {
    init();
    assert!(SplitProvider::from_sdk_key("localhost").is_ok());
}

#[test]
fn rejects_empty_sdk_key() {
    init();
    assert!(matches!(
        SplitProvider::from_sdk_key(""),
        Err(Error::ConfigurationError(_))
    ));
}

#[test]
fn evaluates_typed_treatments() {
    let provider = provider();
    let context = context();

    let resolution = provider.boolean_evaluation("new-checkout", false, &context);
    assert!(resolution.value);
    assert_eq!(resolution.reason, Reason::TargetingMatch);
    assert_eq!(resolution.variant, "on");

    assert!(!provider.boolean_evaluation("dark-mode", true, &context).value);
    assert_eq!(
        provider
            .string_evaluation("banner-copy", String::new(), &context)
            .value,
        "welcome-back"
    );
    assert_eq!(provider.int_evaluation("max-items", 0, &context).value, 25);
    assert_eq!(
        provider
            .float_evaluation("price-multiplier", 1.0, &context)
            .value,
        1.25
    );
    assert_eq!(
        provider
            .object_evaluation("ui-config", json!({}), &context)
            .value,
        json!({"theme": "dark", "columns": 3})
    );
}

#[test]
fn unknown_and_control_flags_serve_default() {
    let provider = provider();
    let context = context();

    for flag in ["not-in-split-file", "retired-flag"] {
        let resolution = provider.int_evaluation(flag, 7, &context);
        assert_eq!(resolution.value, 7);
        assert_eq!(resolution.reason, Reason::Default);
        assert_eq!(resolution.error_code(), Some(ErrorCode::FlagNotFound));
        assert_eq!(resolution.variant, "control");
    }
}

#[test]
fn mistyped_treatment_serves_default() {
    let provider = provider();

    let resolution = provider.int_evaluation("broken-number", 3, &context());

    assert_eq!(resolution.value, 3);
    assert_eq!(resolution.reason, Reason::Error);
    assert_eq!(resolution.error_code(), Some(ErrorCode::ParseError));
    assert_eq!(resolution.variant, "twenty");
}

#[test]
fn missing_targeting_key_serves_default() {
    let provider = provider();
    let context = [("plan".to_owned(), "enterprise".into())].into_iter().collect();

    let resolution = provider.boolean_evaluation("new-checkout", false, &context);

    assert!(!resolution.value);
    assert_eq!(resolution.reason, Reason::Error);
    assert_eq!(resolution.error_code(), Some(ErrorCode::TargetingKeyMissing));
    assert_eq!(resolution.variant, "");
}

#[test]
fn provider_is_shareable_between_threads() {
    let provider = std::sync::Arc::new(provider());

    let handles = (0..4)
        .map(|i| {
            let provider = provider.clone();
            std::thread::spawn(move || {
                let context = [(TARGETING_KEY.to_owned(), format!("user-{i}").into())]
                    .into_iter()
                    .collect();
                provider.boolean_evaluation("new-checkout", false, &context).value
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
