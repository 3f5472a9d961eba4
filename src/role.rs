//! Role registry: per resource-kind role tables and their roll-up maps
//!
//! Each kind declares its capability bits (the permission list), its roles with the
//! roles they imply, and a default role. A table is validated once, when first used.
//! A malformed declaration is a programming error and panics at that point.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{RolebitError, Result};
use crate::value::PermissionValue;

/// Symbolic role identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleKey {
    Read,
    Write,
    Manage,
    AppCreate,
    DatasetCreate,
    ApikeyCreate,
    InvitationManage,
}

impl RoleKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleKey::Read => "read",
            RoleKey::Write => "write",
            RoleKey::Manage => "manage",
            RoleKey::AppCreate => "appCreate",
            RoleKey::DatasetCreate => "datasetCreate",
            RoleKey::ApikeyCreate => "apikeyCreate",
            RoleKey::InvitationManage => "invitationManage",
        }
    }
}

impl std::fmt::Display for RoleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a role is presented in a role picker. Display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckboxBehavior {
    #[default]
    Single,
    Hidden,
    Multiple,
}

/// Static role declaration
#[derive(Debug, Clone, Copy)]
pub struct RoleDef {
    pub key: RoleKey,
    pub value: PermissionValue,
    pub name: &'static str,
    pub description: &'static str,
    pub checkbox: CheckboxBehavior,
    /// Weaker roles this role implies
    pub implies: &'static [RoleKey],
}

/// A validated role with its rolled-up capability set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub key: RoleKey,
    pub value: PermissionValue,
    pub name: &'static str,
    pub description: &'static str,
    pub checkbox: CheckboxBehavior,
    pub rolled: PermissionValue,
}

/// Category of protected thing, each with its own role table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Common,
    Team,
    App,
    Dataset,
}

impl ResourceKind {
    pub fn table(self) -> &'static RoleTable {
        match self {
            ResourceKind::Common => common_roles(),
            ResourceKind::Team => team_roles(),
            ResourceKind::App => app_roles(),
            ResourceKind::Dataset => dataset_roles(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Common => "common",
            ResourceKind::Team => "team",
            ResourceKind::App => "app",
            ResourceKind::Dataset => "dataset",
        }
    }
}

/// Validated role table for one resource kind
#[derive(Debug, Clone)]
pub struct RoleTable {
    kind: ResourceKind,
    per_list: Vec<(RoleKey, PermissionValue)>,
    roles: Vec<Role>,
    role_per_map: HashMap<PermissionValue, PermissionValue>,
    declared: PermissionValue,
    default_role: PermissionValue,
    read: PermissionValue,
    write: PermissionValue,
    manage: PermissionValue,
}

impl RoleTable {
    /// Validate declarations and build the roll-up map
    pub fn build(
        kind: ResourceKind,
        per_list: &[(RoleKey, PermissionValue)],
        defs: &[RoleDef],
        default: RoleKey,
    ) -> Result<Self> {
        let cfg = |msg: String| RolebitError::Config(format!("{} roles: {}", kind.as_str(), msg));

        let mut per_bits = PermissionValue::default();
        for (i, (k, v)) in per_list.iter().enumerate() {
            if v.is_empty() || *v == OWNER_PERMISSION {
                return Err(cfg(format!("permission '{k}' has an invalid bit value {v}")));
            }
            if per_list[..i].iter().any(|(o, _)| o == k) {
                return Err(cfg(format!("permission '{k}' declared twice")));
            }
            if per_bits.intersects(*v) {
                return Err(cfg(format!("permission '{k}' reuses a bit")));
            }
            per_bits |= *v;
        }

        let mut declared = PermissionValue::default();
        for (i, d) in defs.iter().enumerate() {
            if d.value.is_empty() || d.value == OWNER_PERMISSION {
                return Err(cfg(format!("role '{}' has an invalid value {}", d.key, d.value)));
            }
            if defs[..i].iter().any(|o| o.key == d.key) {
                return Err(cfg(format!("role '{}' declared twice", d.key)));
            }
            if declared.intersects(d.value) {
                return Err(cfg(format!("role '{}' reuses a bit", d.key)));
            }
            declared |= d.value;
            if let Some(k) = d.implies.iter().find(|k| !defs.iter().any(|o| o.key == **k)) {
                return Err(cfg(format!("role '{}' implies undeclared role '{k}'", d.key)));
            }
        }
        for d in defs {
            if !per_list.iter().any(|(k, _)| *k == d.key) {
                return Err(cfg(format!("role '{}' has no permission entry", d.key)));
            }
        }
        for (k, _) in per_list {
            if !defs.iter().any(|d| d.key == *k) {
                return Err(cfg(format!("permission '{k}' has no role entry")));
            }
        }

        let mut roles = Vec::with_capacity(defs.len());
        let mut role_per_map = HashMap::with_capacity(defs.len());
        for d in defs {
            let rolled = roll(defs, d, &mut Vec::new()).map_err(cfg)?;
            role_per_map.insert(d.value, rolled);
            roles.push(Role {
                key: d.key,
                value: d.value,
                name: d.name,
                description: d.description,
                checkbox: d.checkbox,
                rolled,
            });
        }

        let per = |k: RoleKey| {
            per_list
                .iter()
                .find(|(o, _)| *o == k)
                .map(|(_, v)| *v)
                .ok_or_else(|| cfg(format!("missing common permission '{k}'")))
        };
        let (read, write, manage) = (per(RoleKey::Read)?, per(RoleKey::Write)?, per(RoleKey::Manage)?);
        let default_role = defs
            .iter()
            .find(|d| d.key == default)
            .map(|d| d.value)
            .ok_or_else(|| cfg(format!("default role '{default}' is not declared")))?;

        Ok(RoleTable {
            kind,
            per_list: per_list.to_vec(),
            roles,
            role_per_map,
            declared,
            default_role,
            read,
            write,
            manage,
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Roles in declaration order
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn role(&self, key: RoleKey) -> Option<&Role> {
        self.roles.iter().find(|r| r.key == key)
    }

    pub fn per(&self, key: RoleKey) -> Option<PermissionValue> {
        self.per_list.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn read_per(&self) -> PermissionValue {
        self.read
    }

    pub fn write_per(&self) -> PermissionValue {
        self.write
    }

    pub fn manage_per(&self) -> PermissionValue {
        self.manage
    }

    pub fn default_role(&self) -> PermissionValue {
        self.default_role
    }

    /// Exact role-value lookup in the roll-up map
    pub fn rolled(&self, raw: PermissionValue) -> Option<PermissionValue> {
        self.role_per_map.get(&raw).copied()
    }

    /// Translate a granted value to its implied capability set.
    ///
    /// Exact role values use the map. A value made only of whole declared roles is the
    /// union of their roll-ups. Anything else is taken as already resolved.
    pub fn roll_up(&self, raw: PermissionValue) -> PermissionValue {
        if let Some(v) = self.rolled(raw) {
            return v;
        }
        if raw.is_empty() || !self.declared.contains(raw) {
            return raw;
        }
        let contained = self.roles.iter().filter(|r| raw.contains(r.value));
        let covered: PermissionValue = contained.clone().map(|r| r.value).collect();
        if covered != raw {
            return raw;
        }
        contained.map(|r| r.rolled).collect()
    }
}

fn roll(defs: &[RoleDef], d: &RoleDef, path: &mut Vec<RoleKey>) -> std::result::Result<PermissionValue, String> {
    if path.contains(&d.key) {
        return Err(format!("implication cycle through '{}'", d.key));
    }
    path.push(d.key);
    let mut acc = d.value;
    for k in d.implies {
        if let Some(next) = defs.iter().find(|o| o.key == *k) {
            acc |= roll(defs, next, path)?;
        }
    }
    path.pop();
    Ok(acc)
}

fn build_or_panic(
    kind: ResourceKind,
    per_list: &[(RoleKey, PermissionValue)],
    defs: &[RoleDef],
    default: RoleKey,
) -> RoleTable {
    match RoleTable::build(kind, per_list, defs, default) {
        Ok(t) => t,
        Err(e) => panic!("{e}"),
    }
}

// ============================================================================
// Declarations
// ============================================================================

const fn def(
    key: RoleKey,
    value: PermissionValue,
    name: &'static str,
    description: &'static str,
    checkbox: CheckboxBehavior,
    implies: &'static [RoleKey],
) -> RoleDef {
    RoleDef { key, value, name, description, checkbox, implies }
}

const COMMON_PER_LIST: &[(RoleKey, PermissionValue)] = &[
    (RoleKey::Read, READ_PER),
    (RoleKey::Write, WRITE_PER),
    (RoleKey::Manage, MANAGE_PER),
];

const COMMON_ROLES: &[RoleDef] = &[
    def(RoleKey::Read, READ_ROLE, "read", "Can view the resource", CheckboxBehavior::Single, &[]),
    def(RoleKey::Write, WRITE_ROLE, "write", "Can edit the resource", CheckboxBehavior::Single, &[RoleKey::Read]),
    def(
        RoleKey::Manage,
        MANAGE_ROLE,
        "manage",
        "Can edit the resource and manage its collaborators",
        CheckboxBehavior::Single,
        &[RoleKey::Write],
    ),
];

const TEAM_PER_LIST: &[(RoleKey, PermissionValue)] = &[
    (RoleKey::Read, READ_PER),
    (RoleKey::Write, WRITE_PER),
    (RoleKey::Manage, MANAGE_PER),
    (RoleKey::ApikeyCreate, TEAM_APIKEY_CREATE_PER),
    (RoleKey::AppCreate, TEAM_APP_CREATE_PER),
    (RoleKey::DatasetCreate, TEAM_DATASET_CREATE_PER),
    (RoleKey::InvitationManage, TEAM_INVITATION_MANAGE_PER),
];

const TEAM_ROLES: &[RoleDef] = &[
    def(RoleKey::Read, TEAM_READ_ROLE, "common_member", "", CheckboxBehavior::Single, &[]),
    def(RoleKey::Write, TEAM_WRITE_ROLE, "write", "", CheckboxBehavior::Hidden, &[RoleKey::Read]),
    def(RoleKey::Manage, TEAM_MANAGE_ROLE, "manage", "", CheckboxBehavior::Single, &[RoleKey::Write]),
    def(
        RoleKey::AppCreate,
        TEAM_APP_CREATE_ROLE,
        "permission_appCreate",
        "",
        CheckboxBehavior::Multiple,
        &[RoleKey::Read, RoleKey::Write],
    ),
    def(
        RoleKey::DatasetCreate,
        TEAM_DATASET_CREATE_ROLE,
        "permission_datasetCreate",
        "",
        CheckboxBehavior::Multiple,
        &[RoleKey::Read, RoleKey::Write],
    ),
    def(
        RoleKey::ApikeyCreate,
        TEAM_APIKEY_CREATE_ROLE,
        "permission_apikeyCreate",
        "",
        CheckboxBehavior::Multiple,
        &[RoleKey::Read, RoleKey::Write],
    ),
    def(
        RoleKey::InvitationManage,
        TEAM_INVITATION_MANAGE_ROLE,
        "permission_invitationManage",
        "",
        CheckboxBehavior::Multiple,
        &[RoleKey::Read, RoleKey::Write],
    ),
];

const APP_ROLES: &[RoleDef] = &[
    def(RoleKey::Read, READ_ROLE, "read", "Can use the app", CheckboxBehavior::Single, &[]),
    def(RoleKey::Write, WRITE_ROLE, "write", "Can edit the app", CheckboxBehavior::Single, &[RoleKey::Read]),
    def(
        RoleKey::Manage,
        MANAGE_ROLE,
        "manage",
        "Can edit the app and manage its collaborators",
        CheckboxBehavior::Single,
        &[RoleKey::Write],
    ),
];

const DATASET_ROLES: &[RoleDef] = &[
    def(RoleKey::Read, READ_ROLE, "read", "Can search the dataset", CheckboxBehavior::Single, &[]),
    def(RoleKey::Write, WRITE_ROLE, "write", "Can edit dataset content", CheckboxBehavior::Single, &[RoleKey::Read]),
    def(
        RoleKey::Manage,
        MANAGE_ROLE,
        "manage",
        "Can edit the dataset and manage its collaborators",
        CheckboxBehavior::Single,
        &[RoleKey::Write],
    ),
];

static COMMON: OnceLock<RoleTable> = OnceLock::new();
static TEAM: OnceLock<RoleTable> = OnceLock::new();
static APP: OnceLock<RoleTable> = OnceLock::new();
static DATASET: OnceLock<RoleTable> = OnceLock::new();

pub fn common_roles() -> &'static RoleTable {
    COMMON.get_or_init(|| build_or_panic(ResourceKind::Common, COMMON_PER_LIST, COMMON_ROLES, RoleKey::Read))
}

pub fn team_roles() -> &'static RoleTable {
    TEAM.get_or_init(|| build_or_panic(ResourceKind::Team, TEAM_PER_LIST, TEAM_ROLES, RoleKey::Read))
}

pub fn app_roles() -> &'static RoleTable {
    APP.get_or_init(|| build_or_panic(ResourceKind::App, COMMON_PER_LIST, APP_ROLES, RoleKey::Read))
}

pub fn dataset_roles() -> &'static RoleTable {
    DATASET.get_or_init(|| build_or_panic(ResourceKind::Dataset, COMMON_PER_LIST, DATASET_ROLES, RoleKey::Read))
}
