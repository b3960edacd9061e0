//! Process-wide error sink.
//!
//! A single sink may be installed per process; [`report`] invokes it on any
//! uncaught framework error. A panicking sink is swallowed so that reporting
//! an error can never take down the reporting thread, and [`safe_execute`]
//! turns panics inside a fallible closure into [`RpcError::Unknown`].

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe, UnwindSafe};
use std::sync::RwLock;

use super::error::{Result, RpcError};

type ErrorSink = Box<dyn Fn(&RpcError) + Send + Sync>;

static SINK: RwLock<Option<ErrorSink>> = RwLock::new(None);

/// Installs the process-wide error sink, replacing any previous one.
pub fn install_error_sink<F>(sink: F)
where
    F: Fn(&RpcError) + Send + Sync + 'static,
{
    if let Ok(mut slot) = SINK.write() {
        *slot = Some(Box::new(sink));
    }
}

/// Removes the installed error sink.
pub fn clear_error_sink() {
    if let Ok(mut slot) = SINK.write() {
        *slot = None;
    }
}

/// Reports an error to the installed sink, or logs it when none is installed.
pub fn report(error: &RpcError) {
    if let Ok(slot) = SINK.read() {
        match slot.as_ref() {
            Some(sink) => {
                let _ = catch_unwind(AssertUnwindSafe(|| sink(error)));
            }
            None => tracing::error!(error = %error, "unhandled rpc error"),
        }
    }
}

/// Runs a fallible closure, converting panics into [`RpcError::Unknown`].
///
/// Failures (returned or panicked) are reported to the error sink before
/// being handed back to the caller.
pub fn safe_execute<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            report(&error);
            Err(error)
        }
        Err(payload) => {
            let error = RpcError::Unknown(panic_message(payload.as_ref()));
            report(&error);
            Err(error)
        }
    }
}

/// Best-effort extraction of a panic payload's message.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "task panicked".to_string()
    }
}
