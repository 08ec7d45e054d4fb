use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use geomcp_common::SessionId;

use crate::session::SessionRegistry;

/// SSE body of a `GET` listen request.
///
/// Ends when the session closes its channel. Dropping it (client disconnect
/// or end of stream) destroys the session.
pub struct ListenStream {
    inner: ReceiverStream<Value>,
    sessions: Arc<SessionRegistry>,
    session_id: SessionId,
}

impl ListenStream {
    pub fn new(
        receiver: mpsc::Receiver<Value>,
        sessions: Arc<SessionRegistry>,
        session_id: SessionId,
    ) -> Self {
        metrics::gauge!("sessions.listeners").increment(1.0);
        Self {
            inner: ReceiverStream::new(receiver),
            sessions,
            session_id,
        }
    }
}

impl Stream for ListenStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner
            .poll_next_unpin(cx)
            .map(|message| message.map(|m| Ok(to_event(&m))))
    }
}

impl Drop for ListenStream {
    fn drop(&mut self) {
        metrics::gauge!("sessions.listeners").decrement(1.0);
        tracing::debug!(session_id = %self.session_id, "Listen stream closed");
        self.sessions.destroy_session(&self.session_id);
    }
}

fn to_event(message: &Value) -> Event {
    Event::default().event("message").data(message.to_string())
}
