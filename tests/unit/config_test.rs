//! Tests for configuration validation

use std::path::PathBuf;

use techwm_scheduler::config::{SchedulerConfig, StorageBackendConfig};
use techwm_scheduler::core::{AccountLimits, PolicyLimits};

#[test]
fn test_default_config_is_valid() {
    let config = SchedulerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.storage, StorageBackendConfig::InMemory);
    assert_eq!(config.policy.default.max_resources, Some(2));
    assert_eq!(config.policy.research.max_gpu, Some(2));
}

#[test]
fn test_inconsistent_limits_rejected() {
    let config = SchedulerConfig {
        policy: PolicyLimits {
            default: AccountLimits {
                max_resources: Some(1),
                max_gpu: None,
                max_cpu: Some(2),
            },
            research: PolicyLimits::default().research,
        },
        storage: StorageBackendConfig::InMemory,
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_file_path_rejected() {
    let config = SchedulerConfig {
        policy: PolicyLimits::default(),
        storage: StorageBackendConfig::File {
            path: PathBuf::new(),
        },
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "policy": {
            "default": { "max_resources": 1, "max_gpu": 0 },
            "research": { "max_resources": 6, "max_gpu": 3, "max_cpu": 3 }
        },
        "storage": { "file": { "path": "/var/lib/techwm" } }
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.policy.default.max_resources, Some(1));
    assert_eq!(config.policy.default.max_cpu, None);
    assert_eq!(config.policy.research.max_resources, Some(6));
    assert_eq!(
        config.storage,
        StorageBackendConfig::File {
            path: PathBuf::from("/var/lib/techwm")
        }
    );
}

#[test]
fn test_scheduler_config_from_json_defaults() {
    let config = SchedulerConfig::from_json_str("{}").unwrap();
    assert_eq!(config, SchedulerConfig::default());
}

#[test]
fn test_scheduler_config_from_bad_json() {
    assert!(SchedulerConfig::from_json_str("{ not json").is_err());
    let invalid = r#"{ "policy": { "default": { "max_resources": 1, "max_gpu": 4 },
                                   "research": {} } }"#;
    assert!(SchedulerConfig::from_json_str(invalid).is_err());
}
