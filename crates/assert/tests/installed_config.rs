//! Installs a process-wide configuration, so it lives in its own test binary.

use contract_assert::{Assert, ConfigError, DiagnosticsConfig, FALLBACK_MESSAGE};
use std::error::Error;

#[test]
fn disabled_reconstruction_falls_back_once_installed() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = DiagnosticsConfig::from_toml_str(
        r#"
reconstruct_call_sites = false

[render]
max_elements = 2
"#,
    )
    .unwrap();
    config.clone().install().unwrap();

    assert_eq!(DiagnosticsConfig::current(), &config);
    assert!(matches!(
        DiagnosticsConfig::default().install(),
        Err(ConfigError::AlreadyInstalled)
    ));

    let err = Assert::is_true(42 == 43).unwrap_err();
    assert_eq!(err.to_string(), FALLBACK_MESSAGE);

    let failed = err.as_failure().unwrap();
    let cause = failed.cause().expect("fallback carries its cause");
    assert!(cause.to_string().starts_with("[INTERNAL ERROR]: "));
    assert!(failed.source().is_some());

    // installed render limits apply to interpolated values
    let err = Assert::array(vec![1, 2, 3]).unwrap().contains(4).unwrap_err();
    assert_eq!(err.to_string(), "Array [1, 2, ...] does not contain value 4.");
}
