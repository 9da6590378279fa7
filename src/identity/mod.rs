//! Identity, sessions and the ambient authentication context.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;
mod request_context;
mod authorizer;

pub use principal::{Principal, Attrs};
pub use session::{Session, SessionToken, SessionManager};
pub use provider::{AuthProvider, LocalAuthProvider, LoginRequest, LoginResponse, SessionLookup, CookieSessionLookup, parse_cookie, SESSION_COOKIE};
pub use request_context::{AuthContext, SessionState};
pub use authorizer::{Role, perms, permissions_for};
