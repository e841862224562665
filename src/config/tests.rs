use super::*;
use serial_test::serial;
use std::env;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_strata_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("STRATA_DB_INDEX");
        env::remove_var("STRATA_CHANNEL_PATTERN");
        env::remove_var("STRATA_EVENT_CAPACITY");
    }
}

#[test]
fn test_default_config() {
    let config = InvalidationConfig::default();

    assert_eq!(config.db_index, 0);
    assert!(config.channel_pattern.is_none());
    assert_eq!(config.event_capacity, 1024);
}

#[test]
fn test_channel_pattern_derived_from_db_index() {
    let config = InvalidationConfig::default();
    assert_eq!(config.channel_pattern(), "__keyevent@0__:*");

    let config = InvalidationConfig {
        db_index: 5,
        ..Default::default()
    };
    assert_eq!(config.channel_pattern(), "__keyevent@5__:*");
}

#[test]
fn test_channel_pattern_override_wins() {
    let config = InvalidationConfig {
        channel_pattern: Some("__keyevent@9__:del".to_string()),
        ..Default::default()
    };
    assert_eq!(config.channel_pattern(), "__keyevent@9__:del");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_strata_env();

    let config = InvalidationConfig::from_env().expect("should parse with defaults");

    assert_eq!(config.db_index, 0);
    assert!(config.channel_pattern.is_none());
    assert_eq!(config.event_capacity, 1024);
}

#[test]
#[serial]
fn test_from_env_with_overrides() {
    clear_strata_env();

    let config = with_env_vars(
        &[
            ("STRATA_DB_INDEX", "3"),
            ("STRATA_CHANNEL_PATTERN", "__keyevent@3__:expired"),
            ("STRATA_EVENT_CAPACITY", "64"),
        ],
        || InvalidationConfig::from_env().expect("should parse overrides"),
    );

    assert_eq!(config.db_index, 3);
    assert_eq!(
        config.channel_pattern.as_deref(),
        Some("__keyevent@3__:expired")
    );
    assert_eq!(config.event_capacity, 64);
}

#[test]
#[serial]
fn test_from_env_rejects_bad_db_index() {
    clear_strata_env();

    let result = with_env_vars(&[("STRATA_DB_INDEX", "not-a-number")], || {
        InvalidationConfig::from_env()
    });

    assert!(matches!(
        result,
        Err(ConfigError::InvalidDbIndex { .. })
    ));
}

#[test]
#[serial]
fn test_from_env_rejects_bad_event_capacity() {
    clear_strata_env();

    let result = with_env_vars(&[("STRATA_EVENT_CAPACITY", "lots")], || {
        InvalidationConfig::from_env()
    });

    assert!(matches!(
        result,
        Err(ConfigError::InvalidEventCapacity { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_capacity() {
    let config = InvalidationConfig {
        event_capacity: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroEventCapacity)
    ));
}

#[test]
fn test_validate_rejects_empty_pattern_override() {
    let config = InvalidationConfig {
        channel_pattern: Some(String::new()),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyChannelPattern)
    ));
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(InvalidationConfig::default().validate().is_ok());
}
