use dynaquery::logger::{AUDIT_TARGET, init_in};
use dynaquery::utils::devlog::TRACE_TARGET;
use tempfile::tempdir;

#[test]
fn init_in_writes_app_audit_and_trace_files() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("logs");
    init_in(&base, "debug", Some(3), true).unwrap();
    log::info!("hello app");
    log::info!(target: AUDIT_TARGET, "audit event");
    log::trace!(target: TRACE_TARGET, "trace event");
    assert!(base.join("app.log").exists());
    assert!(base.join("audit.log").exists());
    assert!(base.join("trace.log").exists());
}
