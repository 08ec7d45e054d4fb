use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use geomcp_common::{GeoMcpError, SessionId};

use super::Session;
use crate::protocol::ProtocolEngine;
use crate::tools::ToolRegistry;

/// Process-wide table of live sessions.
///
/// Created empty at startup and torn down with [`SessionRegistry::shutdown`].
/// The lock is never held across an await point.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    tools: Arc<ToolRegistry>,
    listen_buffer: usize,
}

impl SessionRegistry {
    pub fn new(tools: Arc<ToolRegistry>, listen_buffer: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            tools,
            listen_buffer,
        }
    }

    /// Register a new session under a freshly generated id.
    pub fn create_session(&self) -> Arc<Session> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let id = loop {
            let candidate = SessionId::new();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            tracing::warn!(session_id = %candidate, "Session id collision, regenerating");
        };

        let engine = ProtocolEngine::new(id, Arc::clone(&self.tools));
        let session = Arc::new(Session::new(id, engine, self.listen_buffer));
        sessions.insert(id, Arc::clone(&session));
        let active = sessions.len();
        drop(sessions);

        metrics::counter!("sessions.created").increment(1);
        metrics::gauge!("sessions.active").set(active as f64);
        tracing::info!(session_id = %id, active, "Session created");

        session
    }

    pub fn get_session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Resolve a raw session header value.
    pub fn resolve(&self, raw: Option<&str>) -> Result<Arc<Session>, GeoMcpError> {
        let raw = raw.ok_or(GeoMcpError::MissingSessionId)?;
        let id: SessionId = raw
            .parse()
            .map_err(|_| GeoMcpError::SessionNotFound(raw.to_string()))?;
        self.get_session(&id)
            .ok_or_else(|| GeoMcpError::SessionNotFound(raw.to_string()))
    }

    /// Remove and close a session. Returns whether anything was removed;
    /// destroying an absent session is a no-op.
    pub fn destroy_session(&self, id: &SessionId) -> bool {
        let (removed, active) = {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            let removed = sessions.remove(id);
            (removed, sessions.len())
        };

        let Some(session) = removed else {
            return false;
        };
        let had_listener = session.has_listener();
        session.close();

        metrics::counter!("sessions.destroyed").increment(1);
        metrics::gauge!("sessions.active").set(active as f64);
        tracing::info!(
            session_id = %id,
            age_s = (chrono::Utc::now() - session.created_at()).num_seconds(),
            protocol_version = session.protocol_version().unwrap_or("uninitialized"),
            had_listener,
            active,
            "Session destroyed"
        );
        true
    }

    /// Destroy every live session. Returns how many were destroyed.
    pub fn shutdown(&self) -> usize {
        let ids: Vec<SessionId> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();

        let destroyed = ids.iter().filter(|id| self.destroy_session(id)).count();
        tracing::info!(destroyed, "Session registry shut down");
        destroyed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::tools::ToolHandlerContext;

    fn registry() -> SessionRegistry {
        let tools = Arc::new(ToolRegistry::new(ToolHandlerContext {
            provider: Arc::new(MockProvider::default()),
        }));
        SessionRegistry::new(tools, 8)
    }

    #[test]
    fn test_create_and_lookup() {
        let registry = registry();
        assert!(registry.is_empty());

        let session = registry.create_session();
        assert_eq!(registry.len(), 1);

        let found = registry.get_session(&session.id()).unwrap();
        assert!(Arc::ptr_eq(&found, &session));

        let resolved = registry.resolve(Some(&session.id().to_string())).unwrap();
        assert_eq!(resolved.id(), session.id());
    }

    #[test]
    fn test_resolve_errors() {
        let registry = registry();
        assert!(matches!(
            registry.resolve(None),
            Err(GeoMcpError::MissingSessionId)
        ));
        assert!(matches!(
            registry.resolve(Some("not-a-uuid")),
            Err(GeoMcpError::SessionNotFound(_))
        ));
        assert!(matches!(
            registry.resolve(Some(&SessionId::new().to_string())),
            Err(GeoMcpError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let registry = registry();
        let session = registry.create_session();
        let id = session.id();

        assert!(registry.destroy_session(&id));
        assert!(session.is_closed());
        assert!(registry.get_session(&id).is_none());

        assert!(!registry.destroy_session(&id));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_destroyed_session_rejects_messages() {
        let registry = registry();
        let session = registry.create_session();
        registry.destroy_session(&session.id());

        let msg = crate::protocol::JsonRpcMessage::parse(
            br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
        )
        .unwrap();
        let err = session.handle(msg).await.unwrap_err();
        assert!(err.is_routing_error());
    }

    #[tokio::test]
    async fn test_destroy_ends_listener() {
        let registry = registry();
        let session = registry.create_session();
        let mut rx = session.attach_listener().unwrap();
        assert!(session.has_listener());
        assert_eq!(session.protocol_version(), None);

        registry.destroy_session(&session.id());

        assert!(rx.recv().await.is_none());
        assert!(!session.has_listener());
    }

    #[test]
    fn test_shutdown_destroys_all() {
        let registry = registry();
        let sessions: Vec<_> = (0..5).map(|_| registry.create_session()).collect();

        assert_eq!(registry.shutdown(), 5);
        assert!(registry.is_empty());
        assert!(sessions.iter().all(|s| s.is_closed()));
        assert_eq!(registry.shutdown(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_and_destroy() {
        let registry = Arc::new(registry());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let session = registry.create_session();
                let id = session.id();
                assert!(registry.get_session(&id).is_some());
                assert!(registry.destroy_session(&id));
                assert!(registry.get_session(&id).is_none());
                id
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
        assert!(registry.is_empty());
    }
}
