//! Tests for audit sink

use techwm_scheduler::builders::build_in_memory_scheduler;
use techwm_scheduler::core::{
    build_audit_event, AccountType, AuditSink, InMemoryAuditSink, PermissionLevel, PolicyLimits,
    ResourceKind, ResourceService, TracingAuditSink, User,
};
use techwm_scheduler::infra::SimulatedBackend;
use techwm_scheduler::util::init_tracing;

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("evt1", "4", "alice", "submit", Some("payload".to_string()));

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, "evt1");
    assert_eq!(events[0].job_id, "4");
    assert_eq!(events[0].action, "submit");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("evt1", "1", "alice", "submit", None));
    sink.record(build_audit_event("evt2", "1", "alice", "start", None));
    sink.record(build_audit_event("evt3", "1", "alice", "finish", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, "evt2"); // First one popped
    assert_eq!(events[1].event_id, "evt3");
}

#[test]
fn test_zero_capacity_sink_drops_everything() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("evt1", "1", "alice", "submit", None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("evt1", "9", "bob", "cancel", Some("Running".to_string()));

    assert_eq!(event.event_id, "evt1");
    assert_eq!(event.job_id, "9");
    assert_eq!(event.owner, "bob");
    assert_eq!(event.action, "cancel");
    assert_eq!(event.payload, Some("Running".to_string()));
    assert!(event.created_at_ms > 0);
}

#[test]
fn test_tracing_audit_sink_records() {
    init_tracing();
    let mut sinks: Vec<Box<dyn AuditSink>> =
        vec![Box::new(TracingAuditSink), Box::new(InMemoryAuditSink::new(4))];
    for sink in &mut sinks {
        sink.record(build_audit_event("evt1", "2", "alice", "start", None));
    }
}

#[tokio::test]
async fn test_scheduler_with_tracing_audit_sink() {
    init_tracing();
    let backend = SimulatedBackend::new().with_device("cpu-0", ResourceKind::Cpu);
    let scheduler = build_in_memory_scheduler(&PolicyLimits::default(), backend)
        .with_audit(Box::new(TracingAuditSink));
    scheduler
        .resources()
        .attach_hardware_resource("cpu-0", "core")
        .await
        .unwrap();

    let user = User::new("alice", PermissionLevel::User, AccountType::Default);
    let job = scheduler
        .submit_job(&user, "traced", vec!["cpu-0".to_string()])
        .await
        .unwrap()
        .await
        .unwrap();
    scheduler.finish_job(&job).await.unwrap();
    assert!(scheduler.resources().is_available("cpu-0").await.unwrap());
}
