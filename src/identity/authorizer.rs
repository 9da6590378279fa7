use crate::access::PermissionSet;

/// Permission tokens understood by the control panel.
pub mod perms {
    pub const CONTROL_VIEW: &str = "control:view";
    pub const BLOG_WRITE: &str = "blog:write";
    pub const BLOG_PUBLISH: &str = "blog:publish";
    pub const BLOG_DELETE: &str = "blog:delete";
    pub const USERS_MANAGE: &str = "users:manage";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Editor,
    Author,
    Viewer,
}

impl Role {
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "author" => Some(Role::Author),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    pub fn permissions(self) -> &'static [&'static str] {
        use perms::*;
        match self {
            Role::Admin => &[CONTROL_VIEW, BLOG_WRITE, BLOG_PUBLISH, BLOG_DELETE, USERS_MANAGE],
            Role::Editor => &[CONTROL_VIEW, BLOG_WRITE, BLOG_PUBLISH, BLOG_DELETE],
            Role::Author => &[CONTROL_VIEW, BLOG_WRITE],
            Role::Viewer => &[CONTROL_VIEW],
        }
    }
}

/// Expand role names plus explicit grants into the actor's permission set.
/// Unknown role names contribute nothing.
pub fn permissions_for(roles: &[String], extra: &[String]) -> PermissionSet {
    let mut set = PermissionSet::new();
    for name in roles.iter() {
        match Role::parse(name) {
            Some(role) => {
                for p in role.permissions() { set.insert(p); }
            }
            None => tracing::warn!(target: "auth", role = %name, "ignoring unknown role"),
        }
    }
    for p in extra.iter() { set.insert(p); }
    set
}
