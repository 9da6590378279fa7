use uuid::Uuid;

use crate::access::{has_permission, PermissionSet, Requirement};

use super::{Principal, Session};

/// Where the session lookup stands for the current request.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Lookup has not resolved yet.
    #[default]
    Loading,
    Absent,
    Active(Session),
}

/// Per-request authentication context handed to handlers and renderers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session: SessionState,
    pub request_id: String,
}

impl Default for AuthContext {
    fn default() -> Self { Self::pending() }
}

impl AuthContext {
    pub fn pending() -> Self { Self::with_state(SessionState::Loading) }

    pub fn anonymous() -> Self { Self::with_state(SessionState::Absent) }

    pub fn authenticated(session: Session) -> Self { Self::with_state(SessionState::Active(session)) }

    pub fn from_lookup(found: Option<Session>) -> Self {
        match found {
            Some(s) => Self::authenticated(s),
            None => Self::anonymous(),
        }
    }

    fn with_state(session: SessionState) -> Self {
        Self { session, request_id: Uuid::new_v4().to_string() }
    }

    /// Adopt the id assigned upstream, keeping the generated one otherwise.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        if let Some(id) = request_id { self.request_id = id; }
        self
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.session {
            SessionState::Active(s) => Some(s),
            _ => None,
        }
    }

    pub fn principal(&self) -> Option<&Principal> { self.session().map(|s| &s.principal) }

    /// Permissions of the actor; empty while loading or when signed out.
    pub fn held_permissions(&self) -> &PermissionSet {
        match &self.session {
            SessionState::Active(s) => &s.principal.permissions,
            SessionState::Loading | SessionState::Absent => PermissionSet::empty(),
        }
    }

    pub fn can(&self, required: &Requirement) -> bool {
        has_permission(self.held_permissions(), required)
    }
}
