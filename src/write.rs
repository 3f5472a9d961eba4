//! Public write API - every collaborator change is authorized inside its transaction

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{MANAGE_ROLE, OWNER_PERMISSION};
use crate::db::Store;
use crate::error::{invalid, Result, RolebitError};
use crate::permission::Permission;
use crate::principal::{Principal, PrincipalIds};
use crate::read;
use crate::record::{Collaborator, ResourceType};
use crate::team::{TeamMemberRole, TeamPermission};
use crate::tx::Tx;
use crate::validation::{check_can_remove_permission, check_can_update_permission, Operator, Target};
use crate::value::PermissionValue;

/// How a collaborator batch treats principals it does not list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollaboratorMode {
    /// Write the listed grants, leave everyone else alone (apps)
    #[default]
    Upsert,
    /// Make the listed grants the complete set, removing unlisted non-owners (datasets)
    Sync,
}

impl CollaboratorMode {
    pub const fn for_resource(rt: ResourceType) -> Self {
        match rt {
            ResourceType::Dataset => CollaboratorMode::Sync,
            _ => CollaboratorMode::Upsert,
        }
    }
}

/// One requested grant
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorUpdate {
    #[serde(flatten)]
    pub ids: PrincipalIds,
    pub permission: PermissionValue,
}

impl CollaboratorUpdate {
    pub fn new(principal: &Principal, permission: PermissionValue) -> Self {
        CollaboratorUpdate { ids: principal.into(), permission }
    }

    pub fn principal(&self) -> Result<Principal> {
        Principal::try_from(&self.ids)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub upserted: usize,
    pub deleted: usize,
}

/// A subject's team role and current permission within one scope
struct Subject {
    role: TeamMemberRole,
    permission: Permission,
}

/// Load a principal's standing. Owners of the scope act with role `Owner`; groups and orgs
/// are plain members. A member principal must belong to the team.
fn subject(tx: &Tx, rt: ResourceType, resource_id: Option<&str>, team_id: &str, p: &Principal) -> Result<Subject> {
    let team_role = match p.tmb_id() {
        Some(tmb) => tx
            .member_role(team_id, tmb)?
            .ok_or_else(|| RolebitError::NotFound(format!("member {tmb} in team {team_id}")))?,
        None => TeamMemberRole::Member,
    };
    let permission = read::stored_permission(tx.dbs(), tx.ro(), rt, resource_id, team_id, p)?;
    let role = if permission.is_owner() { TeamMemberRole::Owner } else { team_role };
    Ok(Subject { role, permission })
}

/// The operator must be a team member; anyone else is simply refused. Operators act on
/// their own record only: group and org grants widen what a member may use, never what
/// they may hand out.
fn operator(tx: &Tx, rt: ResourceType, resource_id: Option<&str>, team_id: &str, tmb_id: &str) -> Result<Subject> {
    if tmb_id.is_empty() {
        return Err(invalid("missing operator tmbId"));
    }
    match subject(tx, rt, resource_id, team_id, &Principal::member(tmb_id)) {
        Err(RolebitError::NotFound(_)) => Err(RolebitError::Forbidden),
        r => r,
    }
}

fn require(allowed: bool) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(RolebitError::Forbidden)
    }
}

/// Ownership only moves through `change_owner`
fn check_grant(value: PermissionValue) -> Result<()> {
    if value == OWNER_PERMISSION {
        return Err(invalid("owner permission cannot be granted directly"));
    }
    Ok(())
}

fn require_resource(tx: &Tx, rt: ResourceType, resource_id: &str, team_id: &str) -> Result<String> {
    if rt == ResourceType::Team {
        return Err(invalid("team is not a collaborator resource"));
    }
    tx.owner_of(rt, Some(resource_id), team_id)?
        .ok_or_else(|| RolebitError::NotFound(format!("{rt} {resource_id}")))
}

fn update_one(
    tx: &mut Tx,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    op_id: &str,
    op: &Subject,
    principal: &Principal,
    value: PermissionValue,
) -> Result<bool> {
    if tx.find(rt, resource_id, team_id, principal)? == Some(value) {
        return Ok(false);
    }
    check_grant(value)?;
    let target = subject(tx, rt, resource_id, team_id, principal)?;
    let update = rt.permission(Some(value), false);
    let allowed = check_can_update_permission(
        &Operator { tmb_id: op_id, role: op.role, permission: &op.permission },
        &Target { principal, role: target.role, permission: Some(&target.permission) },
        Some(&update),
    )?;
    require(allowed)?;
    tx.upsert(rt, resource_id, team_id, principal, value)?;
    Ok(true)
}

fn remove_one(
    tx: &mut Tx,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    op_id: &str,
    op: &Subject,
    principal: &Principal,
) -> Result<bool> {
    let target = subject(tx, rt, resource_id, team_id, principal)?;
    let allowed = check_can_remove_permission(
        &Operator { tmb_id: op_id, role: op.role, permission: &op.permission },
        &Target { principal, role: target.role, permission: Some(&target.permission) },
    )?;
    require(allowed)?;
    tx.delete(rt, resource_id, team_id, principal)
}

impl Store {
    // ========================================================================
    // Provisioning (no authorization; called by trusted setup code)
    // ========================================================================

    /// Create a team owned by `owner_tmb`
    pub fn create_team(&self, team_id: &str, owner_tmb: &str) -> Result<()> {
        self.transact(|tx| {
            if tx.owner_of(ResourceType::Team, None, team_id)?.is_some() {
                return Err(invalid(format!("team {team_id} already exists")));
            }
            tx.set_member(team_id, owner_tmb, TeamMemberRole::Owner)?;
            tx.set_owner(ResourceType::Team, None, team_id, owner_tmb)?;
            tx.upsert(ResourceType::Team, None, team_id, &Principal::member(owner_tmb), OWNER_PERMISSION)
        })
    }

    /// Add a member with an optional initial team grant
    pub fn add_member(
        &self,
        team_id: &str,
        tmb_id: &str,
        role: TeamMemberRole,
        permission: Option<PermissionValue>,
    ) -> Result<()> {
        if role == TeamMemberRole::Owner {
            return Err(invalid("a team has exactly one owner"));
        }
        self.transact(|tx| {
            if tx.owner_of(ResourceType::Team, None, team_id)?.is_none() {
                return Err(RolebitError::NotFound(format!("team {team_id}")));
            }
            tx.set_member(team_id, tmb_id, role)?;
            if let Some(v) = permission {
                check_grant(v)?;
                tx.upsert(ResourceType::Team, None, team_id, &Principal::member(tmb_id), v)?;
            }
            Ok(())
        })
    }

    /// Create an app or dataset. The creator needs the matching team create permission
    /// and becomes the owner.
    pub fn create_resource(&self, rt: ResourceType, resource_id: &str, team_id: &str, creator: &str) -> Result<()> {
        self.transact(|tx| {
            if rt == ResourceType::Team {
                return Err(invalid("use create_team for teams"));
            }
            if tx.owner_of(rt, Some(resource_id), team_id)?.is_some() {
                return Err(invalid(format!("{rt} {resource_id} already exists")));
            }
            let op = operator(tx, ResourceType::Team, None, team_id, creator)?;
            let team = TeamPermission::new(Some(op.permission.value()), op.permission.is_owner());
            let allowed = match rt {
                ResourceType::App => team.has_app_create_per(),
                _ => team.has_dataset_create_per(),
            };
            require(allowed)?;
            tx.set_owner(rt, Some(resource_id), team_id, creator)?;
            tx.upsert(rt, Some(resource_id), team_id, &Principal::member(creator), OWNER_PERMISSION)?;
            tracing::info!(resource = %rt, id = resource_id, team = team_id, owner = creator, "resource created");
            Ok(())
        })
    }

    // ========================================================================
    // Team collaborators
    // ========================================================================

    /// Set a principal's team-level grant. Re-sending the current value is a no-op.
    pub fn update_team_collaborator(
        &self,
        team_id: &str,
        operator_tmb: &str,
        principal: &Principal,
        permission: PermissionValue,
    ) -> Result<()> {
        self.transact(|tx| {
            let op = operator(tx, ResourceType::Team, None, team_id, operator_tmb)?;
            update_one(tx, ResourceType::Team, None, team_id, operator_tmb, &op, principal, permission)
        })?;
        tracing::debug!(team = team_id, operator = operator_tmb, target = %principal, %permission, "team grant updated");
        Ok(())
    }

    /// Delete a principal's team-level grant; the member falls back to the default grant
    pub fn remove_team_collaborator(&self, team_id: &str, operator_tmb: &str, principal: &Principal) -> Result<bool> {
        self.transact(|tx| {
            let op = operator(tx, ResourceType::Team, None, team_id, operator_tmb)?;
            remove_one(tx, ResourceType::Team, None, team_id, operator_tmb, &op, principal)
        })
    }

    // ========================================================================
    // App and dataset collaborators
    // ========================================================================

    /// Apply a batch of grants. Any denial rejects the whole batch. Entries that match the
    /// stored value are left alone, and a sync never removes owners or the operator.
    pub fn update_resource_collaborators(
        &self,
        rt: ResourceType,
        resource_id: &str,
        team_id: &str,
        operator_tmb: &str,
        collaborators: &[CollaboratorUpdate],
        mode: CollaboratorMode,
    ) -> Result<SyncOutcome> {
        let outcome = self.transact(|tx| {
            require_resource(tx, rt, resource_id, team_id)?;
            let rid = Some(resource_id);
            let op = operator(tx, rt, rid, team_id, operator_tmb)?;
            require(op.permission.has_manage_per())?;

            let mut out = SyncOutcome::default();
            let mut listed = HashSet::with_capacity(collaborators.len());
            for c in collaborators {
                let principal = c.principal()?;
                if update_one(tx, rt, rid, team_id, operator_tmb, &op, &principal, c.permission)? {
                    out.upserted += 1;
                }
                listed.insert(principal);
            }

            if mode == CollaboratorMode::Sync {
                for rec in tx.list(rt, rid, team_id)? {
                    if listed.contains(&rec.principal)
                        || rec.principal.tmb_id() == Some(operator_tmb)
                        || read::is_owner(tx.dbs(), tx.ro(), rt, rid, team_id, &rec.principal)?
                    {
                        continue;
                    }
                    if remove_one(tx, rt, rid, team_id, operator_tmb, &op, &rec.principal)? {
                        out.deleted += 1;
                    }
                }
            }
            Ok(out)
        })?;
        tracing::debug!(
            resource = %rt, id = resource_id, operator = operator_tmb,
            upserted = outcome.upserted, deleted = outcome.deleted, "collaborators updated"
        );
        Ok(outcome)
    }

    pub fn remove_resource_collaborator(
        &self,
        rt: ResourceType,
        resource_id: &str,
        team_id: &str,
        operator_tmb: &str,
        principal: &Principal,
    ) -> Result<bool> {
        self.transact(|tx| {
            require_resource(tx, rt, resource_id, team_id)?;
            let rid = Some(resource_id);
            let op = operator(tx, rt, rid, team_id, operator_tmb)?;
            require(op.permission.has_manage_per())?;
            remove_one(tx, rt, rid, team_id, operator_tmb, &op, principal)
        })
    }

    /// Transfer ownership. The resource owner or the team owner may do this; the previous
    /// resource owner keeps manage.
    pub fn change_owner(
        &self,
        rt: ResourceType,
        resource_id: &str,
        team_id: &str,
        operator_tmb: &str,
        new_owner: &str,
    ) -> Result<()> {
        let old = self.transact(|tx| {
            let current = require_resource(tx, rt, resource_id, team_id)?;
            let rid = Some(resource_id);
            if !read::is_owner(tx.dbs(), tx.ro(), rt, rid, team_id, &Principal::member(operator_tmb))? {
                return Err(RolebitError::Forbidden);
            }
            if new_owner == current {
                return Ok(None);
            }
            if tx.member_role(team_id, new_owner)?.is_none() {
                return Err(RolebitError::NotFound(format!("member {new_owner} in team {team_id}")));
            }
            tx.upsert(rt, rid, team_id, &Principal::member(current.as_str()), MANAGE_ROLE)?;
            tx.upsert(rt, rid, team_id, &Principal::member(new_owner), OWNER_PERMISSION)?;
            tx.set_owner(rt, rid, team_id, new_owner)?;
            Ok(Some(current))
        })?;
        if let Some(old) = old {
            tracing::info!(resource = %rt, id = resource_id, from = %old, to = new_owner, "ownership transferred");
        }
        Ok(())
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Team listing needs membership; app and dataset listing needs manage
    pub fn list_collaborators(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        operator_tmb: &str,
    ) -> Result<Vec<Collaborator>> {
        self.read(|d, ro| {
            if read::member_role(d, ro, team_id, operator_tmb)?.is_none() {
                return Err(RolebitError::Forbidden);
            }
            if let Some(rid) = resource_id {
                if read::owner_of(d, ro, rt, Some(rid), team_id)?.is_none() {
                    return Err(RolebitError::NotFound(format!("{rt} {rid}")));
                }
            }
            if rt != ResourceType::Team {
                let p = read::member_permission(d, ro, rt, resource_id, team_id, operator_tmb, &[], &[])?;
                require(p.has_manage_per())?;
            }
            read::collaborators(d, ro, rt, resource_id, team_id)
        })
    }
}
