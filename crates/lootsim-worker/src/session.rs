//! The request/response loop.
//!
//! [`serve`] multiplexes two streams: request lines from the caller and
//! messages from the active simulation. At most one simulation is active.
//! A `start` while one is running cancels it and forwards its remaining
//! messages (ending in `cancelled`) before the new one begins, so the
//! caller always sees exactly one terminal message per `start`.
//!
//! Requests are split on raw newlines and decoded from bytes, so a line that
//! is not UTF-8 is rejected like any other malformed line. A rejection is
//! answered with `rejected` and never touches the active simulation.

use lootsim_core::config::WorkerConfig;
use lootsim_core::runner::{SimulationHandle, SimulationRequest, spawn_simulation};
use lootsim_types::{WorkerRequest, WorkerResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::error::WorkerError;

/// Serve requests from `reader` until it reaches EOF and the active
/// simulation, if any, has finished.
pub async fn serve<R, W>(reader: R, writer: W, config: &WorkerConfig) -> Result<(), WorkerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.split(b'\n');
    let mut out = ResponseWriter { writer };
    let mut active: Option<SimulationHandle> = None;
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_segment(), if input_open => {
                match line? {
                    Some(line) => handle_line(&line, &mut active, &mut out, config).await?,
                    None => {
                        debug!(active = active.is_some(), "Request stream closed");
                        input_open = false;
                    }
                }
            }
            message = next_message(&mut active), if active.is_some() => {
                match message {
                    Some(message) => {
                        let terminal = message.is_terminal();
                        out.send(&message).await?;
                        if terminal {
                            finish(active.take()).await;
                        }
                    }
                    None => finish(active.take()).await,
                }
            }
            else => break,
        }
    }
    Ok(())
}

/// Decode one request line.
pub fn decode_request(line: &[u8]) -> Result<WorkerRequest, WorkerError> {
    serde_json::from_slice(line).map_err(|source| WorkerError::Decode { source })
}

async fn handle_line<W: AsyncWrite + Unpin>(
    line: &[u8],
    active: &mut Option<SimulationHandle>,
    out: &mut ResponseWriter<W>,
    config: &WorkerConfig,
) -> Result<(), WorkerError> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    match decode_request(line) {
        Ok(WorkerRequest::Start {
            definition,
            runs,
            seed,
        }) => {
            if let Some(previous) = active.take() {
                info!("Start received while running, cancelling previous simulation");
                previous.cancel();
                drain(previous, out).await?;
            }
            *active = Some(spawn_simulation(
                SimulationRequest {
                    definition,
                    runs,
                    seed,
                },
                config,
            ));
        }
        Ok(WorkerRequest::Cancel) => match active {
            Some(handle) => {
                info!(
                    completed = handle.control().completed(),
                    total = handle.control().total_runs(),
                    "Cancel requested"
                );
                handle.cancel();
            }
            None => debug!("Cancel received while idle"),
        },
        Err(err) => {
            warn!(error = %err, "Rejecting request");
            out.send(&WorkerResponse::Rejected {
                message: err.to_string(),
            })
            .await?;
        }
    }
    Ok(())
}

/// Forward every remaining message of `handle`, then reap it.
async fn drain<W: AsyncWrite + Unpin>(
    mut handle: SimulationHandle,
    out: &mut ResponseWriter<W>,
) -> Result<(), WorkerError> {
    while let Some(message) = handle.recv().await {
        out.send(&message).await?;
    }
    finish(Some(handle)).await;
    Ok(())
}

async fn next_message(active: &mut Option<SimulationHandle>) -> Option<WorkerResponse> {
    match active {
        Some(handle) => handle.recv().await,
        None => std::future::pending().await,
    }
}

async fn finish(handle: Option<SimulationHandle>) {
    if let Some(handle) = handle {
        if let Err(err) = handle.join().await {
            error!(error = %err, "Simulation task ended abnormally");
        }
    }
}

/// Writes one JSON message per line, flushing after each.
struct ResponseWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    async fn send(&mut self, message: &WorkerResponse) -> Result<(), WorkerError> {
        let mut line =
            serde_json::to_vec(message).map_err(|source| WorkerError::Encode { source })?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
