use split_openfeature_provider::{FeatureProvider, SplitProvider, TARGETING_KEY};

pub fn main() {
    env_logger::init();

    // "localhost" serves treatments from ~/.split. Any other key talks to a Split Evaluator.
    let sdk_key = std::env::var("SPLIT_SDK_KEY").unwrap_or_else(|_| "localhost".to_owned());
    let provider = match SplitProvider::from_sdk_key(sdk_key) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("Failed to create provider: {err}");
            std::process::exit(1);
        }
    };

    let context = [
        (TARGETING_KEY.to_owned(), "test-subject".into()),
        ("plan".to_owned(), "enterprise".into()),
    ]
    .into_iter()
    .collect();

    // Falls back to `false` when the flag is unknown or the treatment is not a boolean.
    let resolution = provider.boolean_evaluation("a-boolean-flag", false, &context);

    println!("Resolution: {:?}", resolution);
}
