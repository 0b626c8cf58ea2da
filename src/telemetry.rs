//! Tracing setup and per-request trace correlation.
//!
//! The subscriber emits JSON lines by default (`pretty` is for local runs),
//! and `log::` macros from dependencies are bridged into the same pipeline.
//! A task-local trace id ties problem+json error bodies and log lines to the
//! `x-trace-id` response header.

use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::AppConfig;

/// Correlation metadata for one in-flight request.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static CURRENT_TRACE: TraceContext;
}

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber and the `log` bridge. Only the first call
/// takes effect; later calls are no-ops.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    // Bridge `log::` macros first so nothing emitted during startup is lost.
    // A logger registered earlier (usually a test harness) keeps precedence.
    if let Err(err) = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
    {
        eprintln!("log bridge not installed: {}", err);
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.log_format == "pretty" {
        registry.with(fmt::layer().pretty()).try_init()
    } else {
        registry.with(fmt::layer().json()).try_init()
    };

    if let Err(err) = result {
        INITIALIZED.store(false, Ordering::SeqCst);
        return Err(err.into());
    }

    Ok(())
}

/// Run `future` with `context` as the task-local trace context.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    CURRENT_TRACE.scope(context, future).await
}

/// Trace id of the current task, if a request scope is active.
pub fn current_trace_id() -> Option<String> {
    CURRENT_TRACE.try_with(|ctx| ctx.trace_id.clone()).ok()
}
