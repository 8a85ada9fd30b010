//! Execution trace lines with a thread-local capture sink.
//! Tests enable the sink on their own thread and assert on what an execution
//! emitted, without touching the global logger.

use std::cell::RefCell;

/// Logger target for trace lines routed through `log`.
pub const TRACE_TARGET: &str = "dynaquery::trace";

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Disables the sink when dropped.
pub struct TraceSinkGuard;

impl Drop for TraceSinkGuard {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

pub fn enable_thread_sink() -> TraceSinkGuard {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    TraceSinkGuard
}

pub fn write_str(msg: &str) {
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Take the captured lines, leaving the sink enabled and empty.
pub fn drain() -> Vec<String> {
    TL_SINK.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

pub fn snapshot() -> Vec<String> {
    TL_SINK.with(|s| s.borrow().as_ref().cloned().unwrap_or_default())
}

/// Emit a trace line: captured by the thread sink when enabled, and logged at
/// TRACE under [`TRACE_TARGET`].
#[macro_export]
macro_rules! devtrace {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::utils::devlog::write_str(&__s);
        log::log!(target: $crate::utils::devlog::TRACE_TARGET, log::Level::Trace, "{}", __s);
    }};
}
