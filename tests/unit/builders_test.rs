//! Tests for builder modules

use techwm_scheduler::builders::{build_scheduler, build_storage};
use techwm_scheduler::config::{SchedulerConfig, StorageBackendConfig};
use techwm_scheduler::core::{AccountLimits, PolicyLimits, ResourceKind, ResourceService};
use techwm_scheduler::infra::{SimulatedBackend, Storage};

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let config = SchedulerConfig {
        policy: PolicyLimits {
            default: AccountLimits {
                max_resources: Some(1),
                max_gpu: Some(5),
                max_cpu: None,
            },
            research: AccountLimits::unlimited(),
        },
        storage: StorageBackendConfig::InMemory,
    };
    assert!(build_scheduler(&config, SimulatedBackend::new()).is_err());
}

#[tokio::test]
async fn test_build_scheduler_in_memory() {
    let backend = SimulatedBackend::new().with_device("cpu-0", ResourceKind::Cpu);
    let scheduler = build_scheduler(&SchedulerConfig::default(), backend).unwrap();
    assert_eq!(scheduler.policy(), &PolicyLimits::default());
    scheduler
        .resources()
        .attach_hardware_resource("cpu-0", "core")
        .await
        .unwrap();
    assert_eq!(scheduler.resources().attached_resources(1).await.unwrap(), vec!["cpu-0"]);
}

#[tokio::test]
async fn test_build_file_storage_creates_directory() {
    let dir = std::env::temp_dir().join(format!("techwm-builder-{}", uuid::Uuid::new_v4()));
    let storage = build_storage(&StorageBackendConfig::File { path: dir.clone() }, "jobs").unwrap();
    storage.write_string("job#counter", "3").await.unwrap();
    assert!(dir.join("jobs.jsonl").exists());
    let _ = std::fs::remove_dir_all(dir);
}
