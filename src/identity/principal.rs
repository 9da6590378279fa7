use serde::{Deserialize, Serialize};

use crate::access::PermissionSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attrs {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// The authenticated actor. `permissions` defaults to empty when absent so
/// nothing downstream ever handles a missing permission field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Principal {
    pub fn display_name(&self) -> &str {
        self.attrs.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_permissions_default_to_empty() {
        let p: Principal = serde_json::from_str(r#"{"user_id":"ana"}"#).unwrap();
        assert!(p.permissions.is_empty());
        assert!(p.roles.is_empty());
        assert_eq!(p.display_name(), "ana");
    }

    #[test]
    fn permissions_are_normalized_on_load() {
        let p: Principal = serde_json::from_str(r#"{"user_id":"ana","permissions":[" blog:write ",""]}"#).unwrap();
        assert_eq!(p.permissions.len(), 1);
        assert!(p.permissions.contains("blog:write"));
    }
}
