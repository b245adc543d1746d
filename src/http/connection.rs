use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::framer::Framer;
use crate::http::handler::respond;
use crate::http::request::Incoming;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::context::ServerContext;

/// One accepted connection: a single request, a single response, then close.
pub struct Connection<S> {
    stream: S,
    ctx: Arc<ServerContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Incoming),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: Arc<ServerContext>) -> Self {
        Self {
            stream,
            ctx,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Read failures end the connection without a response; the error is
    /// returned for the caller to log.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    // Sampled once; a toggle mid-request doesn't affect this connection.
                    let incoming = if self.ctx.maintenance.is_paused() {
                        Incoming::Pause
                    } else {
                        Incoming::Message(self.read_request().await?)
                    };
                    self.state = ConnectionState::Processing(incoming);
                }

                ConnectionState::Processing(incoming) => {
                    let response = Self::handle_request(incoming, &self.ctx).await;
                    let writer = ResponseWriter::new(&response);
                    if self.ctx.dump_messages {
                        tracing::debug!(response = %String::from_utf8_lossy(writer.bytes()), "Response message");
                    }
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("writing response")?;
                    let _ = self.stream.shutdown().await;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn read_request(&mut self) -> anyhow::Result<bytes::Bytes> {
        let framer = Framer::new(self.ctx.read_buffer_size, self.ctx.read_timeout);
        let message = framer
            .read_message(&mut self.stream)
            .await
            .context("reading request")?;

        if self.ctx.dump_messages {
            tracing::debug!(request = %String::from_utf8_lossy(&message), "Request message");
        }
        Ok(message)
    }

    async fn handle_request(incoming: &Incoming, ctx: &Arc<ServerContext>) -> Response {
        let task_ctx = Arc::clone(ctx);
        let task_incoming = incoming.clone();
        respond_isolated(async move { respond(&task_incoming, &task_ctx).await }, ctx).await
    }
}

/// Runs `build` on its own task so a panic surfaces as a 500 instead of a
/// dropped connection.
pub async fn respond_isolated<F>(build: F, ctx: &ServerContext) -> Response
where
    F: Future<Output = Response> + Send + 'static,
{
    match tokio::spawn(build).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Response construction failed");
            respond(&Incoming::Error, ctx).await
        }
    }
}
