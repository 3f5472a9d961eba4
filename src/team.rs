//! Team-level permission and member roles

use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::permission::Permission;
use crate::role::team_roles;
use crate::value::PermissionValue;

/// A member's standing in a team. Only `Owner` carries authority of its own;
/// `Admin` and `Member` are labels, capabilities come from the team permission record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamMemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl TeamMemberRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Read a stored role leniently. Legacy records may lack the field.
    pub fn from_stored(id: &str, stored: Option<&str>) -> Self {
        match stored.map(str::parse::<Self>) {
            Some(Ok(r)) => r,
            Some(Err(_)) | None => {
                tracing::warn!(member = id, stored = ?stored, "member has no usable role, falling back to member");
                Self::Member
            }
        }
    }
}

impl FromStr for TeamMemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(format!("Unknown team member role: {s}")),
        }
    }
}

impl std::fmt::Display for TeamMemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission over the team role table with the team's functional flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPermission {
    #[serde(flatten)]
    base: Permission,
    has_app_create_role: bool,
    has_dataset_create_role: bool,
    has_apikey_create_role: bool,
    has_invitation_manage_role: bool,
    has_app_create_per: bool,
    has_dataset_create_per: bool,
    has_apikey_create_per: bool,
    has_invitation_manage_per: bool,
}

impl TeamPermission {
    pub fn new(role: Option<PermissionValue>, is_owner: bool) -> Self {
        // zero is not a usable team grant; it means "use the default"
        let role = role.filter(|r| !r.is_empty());
        Self::from_base(Permission::new(team_roles(), role, is_owner))
    }

    fn from_base(base: Permission) -> Self {
        TeamPermission {
            has_app_create_role: base.check_role(TEAM_APP_CREATE_ROLE),
            has_dataset_create_role: base.check_role(TEAM_DATASET_CREATE_ROLE),
            has_apikey_create_role: base.check_role(TEAM_APIKEY_CREATE_ROLE),
            has_invitation_manage_role: base.check_role(TEAM_INVITATION_MANAGE_ROLE),
            has_app_create_per: base.check_per(TEAM_APP_CREATE_PER),
            has_dataset_create_per: base.check_per(TEAM_DATASET_CREATE_PER),
            has_apikey_create_per: base.check_per(TEAM_APIKEY_CREATE_PER),
            has_invitation_manage_per: base.check_per(TEAM_INVITATION_MANAGE_PER),
            base,
        }
    }

    pub fn has_app_create_role(&self) -> bool {
        self.has_app_create_role
    }

    pub fn has_dataset_create_role(&self) -> bool {
        self.has_dataset_create_role
    }

    pub fn has_apikey_create_role(&self) -> bool {
        self.has_apikey_create_role
    }

    pub fn has_invitation_manage_role(&self) -> bool {
        self.has_invitation_manage_role
    }

    pub fn has_app_create_per(&self) -> bool {
        self.has_app_create_per
    }

    pub fn has_dataset_create_per(&self) -> bool {
        self.has_dataset_create_per
    }

    pub fn has_apikey_create_per(&self) -> bool {
        self.has_apikey_create_per
    }

    pub fn has_invitation_manage_per(&self) -> bool {
        self.has_invitation_manage_per
    }

    #[must_use]
    pub fn with_role(&self, role: PermissionValue) -> Self {
        Self::from_base(self.base.with_role(role))
    }

    #[must_use]
    pub fn with_owner(&self, is_owner: bool) -> Self {
        Self::from_base(self.base.with_owner(is_owner))
    }

    pub fn into_inner(self) -> Permission {
        self.base
    }
}

impl Default for TeamPermission {
    fn default() -> Self {
        Self::new(None, false)
    }
}

impl Deref for TeamPermission {
    type Target = Permission;

    fn deref(&self) -> &Permission {
        &self.base
    }
}
