//! Persisted permission record types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::NULL_PERMISSION;
use crate::permission::Permission;
use crate::principal::Principal;
use crate::role::ResourceKind;
use crate::team::TeamPermission;
use crate::value::PermissionValue;

/// Resource types that carry permission records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Team,
    App,
    Dataset,
}

impl ResourceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceType::Team => "team",
            ResourceType::App => "app",
            ResourceType::Dataset => "dataset",
        }
    }

    pub const fn kind(self) -> ResourceKind {
        match self {
            ResourceType::Team => ResourceKind::Team,
            ResourceType::App => ResourceKind::App,
            ResourceType::Dataset => ResourceKind::Dataset,
        }
    }

    /// Interpret a stored value. A missing team record is the default member grant;
    /// a missing app or dataset record grants nothing.
    pub fn permission(self, stored: Option<PermissionValue>, is_owner: bool) -> Permission {
        match self {
            ResourceType::Team => TeamPermission::new(stored, is_owner).into_inner(),
            _ => Permission::new(self.kind().table(), Some(stored.unwrap_or(NULL_PERMISSION)), is_owner),
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" => Ok(ResourceType::Team),
            "app" => Ok(ResourceType::App),
            "dataset" => Ok(ResourceType::Dataset),
            _ => Err(format!("Unknown resource type: {s}")),
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored grant: (type, resource, team, principal) -> role value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermissionRecord {
    pub resource_type: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub team_id: String,
    #[serde(flatten)]
    pub principal: Principal,
    pub permission: PermissionValue,
}

/// A collaborator entry as listed to managers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    #[serde(flatten)]
    pub principal: Principal,
    /// Value as granted
    pub permission: PermissionValue,
    /// Capability set implied by the grant
    pub rolled: PermissionValue,
    pub is_owner: bool,
}
