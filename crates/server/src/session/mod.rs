mod registry;

pub use registry::SessionRegistry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use geomcp_common::{GeoMcpError, SessionId};

use crate::protocol::{JsonRpcMessage, JsonRpcResponse, ProtocolEngine};

/// Why a listen stream could not be attached.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("Session already has an active listen stream")]
    AlreadyAttached,

    #[error("Session is closed")]
    Closed,
}

enum ChannelState {
    Detached,
    Attached(mpsc::Sender<Value>),
    Closed,
}

/// Server-to-client half of a session: at most one listen stream receives
/// pushed JSON-RPC messages. The lock is never held across an await.
pub struct SessionChannel {
    state: Mutex<ChannelState>,
    buffer: usize,
}

impl SessionChannel {
    pub fn new(buffer: usize) -> Self {
        Self {
            state: Mutex::new(ChannelState::Detached),
            buffer: buffer.max(1),
        }
    }

    /// Claim the push side for a new listen stream.
    ///
    /// A previous listener whose receiver has been dropped no longer counts
    /// as attached.
    pub fn attach(&self) -> Result<mpsc::Receiver<Value>, AttachError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            ChannelState::Closed => return Err(AttachError::Closed),
            ChannelState::Attached(tx) if !tx.is_closed() => {
                return Err(AttachError::AlreadyAttached)
            }
            _ => {}
        }

        let (tx, rx) = mpsc::channel(self.buffer);
        *state = ChannelState::Attached(tx);
        Ok(rx)
    }

    pub fn is_attached(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(&*state, ChannelState::Attached(tx) if !tx.is_closed())
    }

    /// Push one message to the attached listener.
    ///
    /// Returns `Ok(false)` when nobody is listening. A listener that went
    /// away mid-send is a `Transport` error.
    pub async fn push(&self, message: Value) -> Result<bool, GeoMcpError> {
        let sender = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                ChannelState::Attached(tx) => tx.clone(),
                ChannelState::Detached | ChannelState::Closed => return Ok(false),
            }
        };

        sender
            .send(message)
            .await
            .map_err(|_| GeoMcpError::Transport("listen stream closed".into()))?;
        Ok(true)
    }

    /// Drop the sender so any attached listen stream ends; refuse new ones.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = ChannelState::Closed;
    }
}

/// One MCP session: an id, its protocol engine and its push channel.
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    engine: ProtocolEngine,
    channel: SessionChannel,
    closed: AtomicBool,
}

impl Session {
    pub(crate) fn new(id: SessionId, engine: ProtocolEngine, listen_buffer: usize) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            engine,
            channel: SessionChannel::new(listen_buffer),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn protocol_version(&self) -> Option<&'static str> {
        self.engine.protocol_version()
    }

    /// Hand one inbound message to the session's engine.
    pub async fn handle(
        &self,
        message: JsonRpcMessage,
    ) -> Result<Option<JsonRpcResponse>, GeoMcpError> {
        if self.is_closed() {
            return Err(GeoMcpError::SessionNotFound(self.id.to_string()));
        }
        self.engine.handle(message, &self.channel).await
    }

    /// Push a server-initiated message to the listen stream, if any.
    pub async fn notify(&self, message: Value) -> Result<bool, GeoMcpError> {
        self.channel.push(message).await
    }

    pub fn attach_listener(&self) -> Result<mpsc::Receiver<Value>, AttachError> {
        if self.is_closed() {
            return Err(AttachError::Closed);
        }
        self.channel.attach()
    }

    pub fn has_listener(&self) -> bool {
        self.channel.is_attached()
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.channel.close();
    }
}
