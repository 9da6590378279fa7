use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::tprintln;

use super::principal::Principal;

pub type SessionToken = String;

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    pub csrf_token: String,
    pub principal: Principal,
    pub expires_at: Instant,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: Instant) -> bool { self.expires_at <= now }
}

#[derive(Debug, Default)]
struct SessionTables {
    // token -> session
    sessions: HashMap<SessionToken, Session>,
    // user_id -> tokens
    user_index: HashMap<String, HashSet<SessionToken>>,
}

impl SessionTables {
    fn remove(&mut self, token: &str) -> Option<Session> {
        let sess = self.sessions.remove(token)?;
        if let Some(set) = self.user_index.get_mut(&sess.principal.user_id) {
            set.remove(token);
            if set.is_empty() { self.user_index.remove(&sess.principal.user_id); }
        }
        Some(sess)
    }
}

fn gen_id() -> Result<String> {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow!("token entropy unavailable: {}", e))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// In-process session store. Cloning shares the underlying tables.
#[derive(Clone)]
pub struct SessionManager {
    pub ttl: Duration,
    tables: Arc<RwLock<SessionTables>>,
}

impl Default for SessionManager {
    fn default() -> Self { Self::new(Duration::from_secs(60 * 60)) }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, tables: Arc::new(RwLock::new(SessionTables::default())) }
    }

    pub fn issue(&self, principal: Principal) -> Result<Session> {
        let now = Instant::now();
        let sess = Session {
            session_id: gen_id()?,
            token: gen_id()?,
            csrf_token: gen_id()?,
            principal,
            expires_at: now + self.ttl,
            issued_at: Utc::now(),
        };
        {
            let mut t = self.tables.write();
            t.sessions.insert(sess.token.clone(), sess.clone());
            t.user_index.entry(sess.principal.user_id.clone()).or_default().insert(sess.token.clone());
        }
        tprintln!("session.issue user={} sid={} ttl_secs={}", sess.principal.user_id, sess.session_id, self.ttl.as_secs());
        Ok(sess)
    }

    /// Return a snapshot of the live session for `token`. Expired sessions are
    /// dropped on sight.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        let expired = {
            let t = self.tables.read();
            match t.sessions.get(token) {
                Some(s) if !s.is_expired_at(now) => return Some(s.clone()),
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.tables.write().remove(token);
            debug!(target: "session", "session expired");
        }
        None
    }

    pub fn logout(&self, token: &str) -> bool {
        let removed = self.tables.write().remove(token);
        if let Some(s) = &removed {
            tprintln!("session.logout user={} sid={}", s.principal.user_id, s.session_id);
        }
        removed.is_some()
    }

    pub fn revoke_user(&self, user_id: &str) -> usize {
        let mut t = self.tables.write();
        let tokens: Vec<SessionToken> = t.user_index.get(user_id).map(|s| s.iter().cloned().collect()).unwrap_or_default();
        let count = tokens.iter().filter(|tok| t.remove(tok).is_some()).count();
        tprintln!("session.revoke user={} count={}", user_id, count);
        count
    }

    /// Remove every expired session; returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut t = self.tables.write();
        let dead: Vec<SessionToken> = t
            .sessions
            .iter()
            .filter(|(_, s)| s.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        for k in dead.iter() { t.remove(k); }
        dead.len()
    }

    pub fn active_count(&self) -> usize { self.tables.read().sessions.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(user: &str) -> Principal {
        Principal { user_id: user.into(), ..Default::default() }
    }

    #[test]
    fn issue_then_validate() {
        let sm = SessionManager::default();
        let s = sm.issue(principal("ana")).unwrap();
        assert_ne!(s.token, s.csrf_token);
        let got = sm.validate(&s.token).expect("live session");
        assert_eq!(got.principal.user_id, "ana");
        assert!(sm.validate("unknown").is_none());
    }

    #[test]
    fn logout_removes_session() {
        let sm = SessionManager::default();
        let s = sm.issue(principal("ana")).unwrap();
        assert!(sm.logout(&s.token));
        assert!(!sm.logout(&s.token));
        assert!(sm.validate(&s.token).is_none());
    }

    #[test]
    fn expired_sessions_do_not_validate_and_are_swept() {
        let sm = SessionManager::new(Duration::ZERO);
        let a = sm.issue(principal("ana")).unwrap();
        let _b = sm.issue(principal("bo")).unwrap();
        assert!(sm.validate(&a.token).is_none());
        assert_eq!(sm.active_count(), 1);
        assert_eq!(sm.sweep_expired(), 1);
        assert_eq!(sm.active_count(), 0);
    }

    #[test]
    fn revoke_user_drops_all_their_sessions() {
        let sm = SessionManager::default();
        let a1 = sm.issue(principal("ana")).unwrap();
        let a2 = sm.issue(principal("ana")).unwrap();
        let b = sm.issue(principal("bo")).unwrap();
        assert_eq!(sm.revoke_user("ana"), 2);
        assert!(sm.validate(&a1.token).is_none());
        assert!(sm.validate(&a2.token).is_none());
        assert!(sm.validate(&b.token).is_some());
    }

    #[test]
    fn clones_share_tables() {
        let sm = SessionManager::default();
        let other = sm.clone();
        let s = sm.issue(principal("ana")).unwrap();
        assert!(other.validate(&s.token).is_some());
    }
}
