//! The authorization value object

use serde::Serialize;

use crate::constants::OWNER_PERMISSION;
use crate::role::{common_roles, ResourceKind, RoleTable};
use crate::value::{has_capability, PermissionValue};

/// A principal's resolved capability set on one resource kind.
///
/// `value` always holds the rolled-up bitmask. Derived flags are computed once in the
/// constructor; changing role or ownership builds a new value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    value: PermissionValue,
    is_owner: bool,
    #[serde(skip)]
    table: &'static RoleTable,
    has_read_per: bool,
    has_write_per: bool,
    has_manage_per: bool,
}

impl Permission {
    /// Build from an optional granted value. `None` means the kind's default role.
    pub fn new(table: &'static RoleTable, role: Option<PermissionValue>, is_owner: bool) -> Self {
        let raw = role.unwrap_or_else(|| table.default_role());
        let value = table.roll_up(raw);
        let is_owner = is_owner || value == OWNER_PERMISSION;
        let mut p = Permission {
            value,
            is_owner,
            table,
            has_read_per: false,
            has_write_per: false,
            has_manage_per: false,
        };
        p.has_read_per = p.check_per(table.read_per());
        p.has_write_per = p.check_per(table.write_per());
        p.has_manage_per = p.check_per(table.manage_per());
        p
    }

    /// Permission over the common role table
    pub fn common(role: Option<PermissionValue>, is_owner: bool) -> Self {
        Self::new(common_roles(), role, is_owner)
    }

    pub fn owner(table: &'static RoleTable) -> Self {
        Self::new(table, None, true)
    }

    pub fn value(&self) -> PermissionValue {
        self.value
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn kind(&self) -> ResourceKind {
        self.table.kind()
    }

    pub fn table(&self) -> &'static RoleTable {
        self.table
    }

    pub fn has_read_per(&self) -> bool {
        self.has_read_per
    }

    pub fn has_write_per(&self) -> bool {
        self.has_write_per
    }

    pub fn has_manage_per(&self) -> bool {
        self.has_manage_per
    }

    /// Ownership short-circuits every other check
    #[inline]
    pub fn check_per(&self, required: PermissionValue) -> bool {
        self.is_owner || has_capability(self.value, required)
    }

    /// Role-oriented alias of [`check_per`](Self::check_per)
    #[inline]
    pub fn check_role(&self, role: PermissionValue) -> bool {
        self.check_per(role)
    }

    #[must_use]
    pub fn with_role(&self, role: PermissionValue) -> Self {
        Self::new(self.table, Some(role), self.is_owner)
    }

    #[must_use]
    pub fn with_owner(&self, is_owner: bool) -> Self {
        // keep the stored value; ownership is not a bit
        Self::new(self.table, Some(self.value), is_owner)
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.is_owner == other.is_owner && self.kind() == other.kind()
    }
}

impl Eq for Permission {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::role::team_roles;

    #[test]
    fn default_is_rolled_read() {
        let p = Permission::common(None, false);
        assert_eq!(p.value(), READ_ROLLED);
        assert!(p.has_read_per());
        assert!(!p.has_write_per());
        assert!(!p.has_manage_per());
    }

    #[test]
    fn raw_role_is_rolled_up() {
        let p = Permission::common(Some(MANAGE_ROLE), false);
        assert_eq!(p.value(), MANAGE_ROLLED);
        assert!(p.has_read_per() && p.has_write_per() && p.has_manage_per());

        let pre_rolled = Permission::common(Some(MANAGE_ROLLED), false);
        assert_eq!(pre_rolled, p);
    }

    #[test]
    fn owner_overrides_every_check() {
        let p = Permission::common(Some(NULL_PERMISSION), true);
        assert_eq!(p.value(), NULL_PERMISSION);
        for required in [READ_PER, MANAGE_PER, TEAM_ADMIN_PERMISSION, OWNER_PERMISSION] {
            assert!(p.check_per(required));
        }
        assert!(p.has_manage_per());
    }

    #[test]
    fn owner_sentinel_sets_owner() {
        let p = Permission::new(team_roles(), Some(OWNER_PERMISSION), false);
        assert!(p.is_owner());
    }

    #[test]
    fn explicit_null_means_no_permission() {
        let p = Permission::common(Some(NULL_PERMISSION), false);
        assert!(!p.has_read_per());
        assert!(p.check_per(NULL_PERMISSION));
    }

    #[test]
    fn rebuild_recomputes_flags() {
        let p = Permission::common(Some(READ_ROLE), false);
        let q = p.with_role(MANAGE_ROLE);
        assert!(!p.has_manage_per());
        assert!(q.has_manage_per());
        let o = p.with_owner(true);
        assert!(o.has_manage_per());
        assert_eq!(o.value(), READ_ROLLED);
        assert!(!o.with_owner(false).has_manage_per());
    }
}
