//! App-level permission

use std::ops::Deref;

use serde::Serialize;

use crate::permission::Permission;
use crate::role::app_roles;
use crate::value::PermissionValue;

/// Permission over the app role table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppPermission(Permission);

impl AppPermission {
    pub fn new(role: Option<PermissionValue>, is_owner: bool) -> Self {
        AppPermission(Permission::new(app_roles(), role, is_owner))
    }

    #[must_use]
    pub fn with_role(&self, role: PermissionValue) -> Self {
        AppPermission(self.0.with_role(role))
    }

    pub fn into_inner(self) -> Permission {
        self.0
    }
}

impl Deref for AppPermission {
    type Target = Permission;

    fn deref(&self) -> &Permission {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::role::ResourceKind;

    #[test]
    fn app_collaborator_flags() {
        let p = AppPermission::new(Some(WRITE_ROLE), false);
        assert_eq!(p.kind(), ResourceKind::App);
        assert!(p.has_write_per() && p.has_read_per());
        assert!(!p.has_manage_per());
        assert!(p.with_role(MANAGE_ROLE).has_manage_per());
    }

    #[test]
    fn removed_collaborator_has_nothing() {
        let p = AppPermission::new(Some(NULL_PERMISSION), false);
        assert!(!p.has_read_per());
    }
}
