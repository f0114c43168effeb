//! Implementation of the `promptstep run` command.
//!
//! Wires the CLI to a [`StepController`] over HTTP. The build log is stdout,
//! optionally teed to `--log-file`. Ctrl-C cancels the in-flight call or
//! backoff sleep and the cancellation is recorded like any other failure.

use super::{build_context, load_config, load_template};
use crate::cli::RunArgs;
use crate::client::{CancelHandle, CancelToken, HttpTransport};
use crate::error::Result;
use crate::recorder::{FileSink, LogSink, Recorder, StdoutSink, TeeSink};
use crate::step::{StepController, StepReport};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Execute the `promptstep run` command.
pub async fn cmd_run(args: RunArgs) -> Result<i32> {
    let mut sink = TeeSink::new().with(StdoutSink);
    if let Some(path) = &args.log_file {
        sink = sink.with(FileSink::create(path)?);
    }

    let handle = CancelHandle::new();
    let token = handle.token();
    let interrupt = listen_for_interrupt(handle)?;

    let report = run_step(&args, &mut sink, &token).await;
    interrupt.abort();

    Ok(report?.exit_code())
}

/// Cancel `handle` on SIGINT / Ctrl-C.
///
/// The OS handler is registered before this returns, so an interrupt that
/// arrives while the step is starting up is still recorded as a cancellation.
#[cfg(unix)]
fn listen_for_interrupt(handle: CancelHandle) -> Result<JoinHandle<()>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        if interrupt.recv().await.is_some() {
            warn!("Interrupted, cancelling step");
            handle.cancel();
        }
    }))
}

#[cfg(windows)]
fn listen_for_interrupt(handle: CancelHandle) -> Result<JoinHandle<()>> {
    let mut interrupt = tokio::signal::windows::ctrl_c()?;
    Ok(tokio::spawn(async move {
        if interrupt.recv().await.is_some() {
            warn!("Interrupted, cancelling step");
            handle.cancel();
        }
    }))
}

/// Resolve arguments into a controller and run it once.
///
/// Errors here are setup errors (arguments, config, prompt file); anything
/// after setup is reported through the returned [`StepReport`].
async fn run_step(
    args: &RunArgs,
    sink: &mut dyn LogSink,
    cancel: &CancelToken,
) -> Result<StepReport> {
    let config = load_config(&args.config)?;
    let template = load_template(&args.prompt)?;
    let context = build_context(&args.context)?;

    debug!(
        endpoint = %config.endpoint,
        timeout_ms = config.timeout_ms,
        max_retries = config.max_retries,
        variables = context.len(),
        "Starting step"
    );

    let transport =
        HttpTransport::new(config.endpoint.trim(), config.timeout())?.with_api_key(config.api_key()?);
    let controller = StepController::new(
        transport,
        config.call_config(),
        Recorder::new(config.step_name.clone()),
    )
    .echo_prompt(config.echo_prompt);

    Ok(controller.run(&template, &context, sink, cancel).await)
}
