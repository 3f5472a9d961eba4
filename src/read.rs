//! Read operations (no permission checks, direct LMDB access)

use heed::RoTxn;

use crate::db::{check_scope, Dbs, Store};
use crate::error::{err, Result};
use crate::keys::{member_key, member_prefix, owner_key, parse_key, record_key, record_prefix, record_principal};
use crate::permission::Permission;
use crate::principal::{check_id, Principal};
use crate::record::{Collaborator, ResourcePermissionRecord, ResourceType};
use crate::team::TeamMemberRole;
use crate::value::PermissionValue;

/// Stored value of one record
#[inline]
pub(crate) fn find(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    p: &Principal,
) -> Result<Option<PermissionValue>> {
    check_scope(rt, resource_id, team_id)?;
    p.validate()?;
    let v = d.records.get(tx, &record_key(rt, resource_id, team_id, p)).map_err(err)?;
    Ok(v.map(PermissionValue::from_bits))
}

/// All records on one resource within a team
pub(crate) fn list(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
) -> Result<Vec<ResourcePermissionRecord>> {
    check_scope(rt, resource_id, team_id)?;
    let pfx = record_prefix(rt, resource_id, team_id);
    let mut r = Vec::new();
    for item in d.records.prefix_iter(tx, &pfx).map_err(err)? {
        let (k, v) = item.map_err(err)?;
        if let Some(principal) = record_principal(k) {
            r.push(ResourcePermissionRecord {
                resource_type: rt,
                resource_id: resource_id.map(str::to_string),
                team_id: team_id.to_string(),
                principal,
                permission: PermissionValue::from_bits(v),
            });
        }
    }
    Ok(r)
}

/// OR of a member's own record with the records of the groups and orgs it belongs to,
/// each rolled up first. `None` when no record exists at all.
pub(crate) fn resolve(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    tmb_id: &str,
    groups: &[&str],
    orgs: &[&str],
) -> Result<Option<PermissionValue>> {
    let table = rt.kind().table();
    let principals = std::iter::once(Principal::member(tmb_id))
        .chain(groups.iter().map(|g| Principal::group(*g)))
        .chain(orgs.iter().map(|o| Principal::org(*o)));
    let mut mask: Option<PermissionValue> = None;
    for p in principals {
        if let Some(v) = find(d, tx, rt, resource_id, team_id, &p)? {
            mask = Some(mask.unwrap_or_default() | table.roll_up(v));
        }
    }
    Ok(mask)
}

pub(crate) fn member_role(d: &Dbs, tx: &RoTxn, team_id: &str, tmb_id: &str) -> Result<Option<TeamMemberRole>> {
    check_id("teamId", team_id)?;
    check_id("tmbId", tmb_id)?;
    let stored = d.members.get(tx, &member_key(team_id, tmb_id)).map_err(err)?;
    Ok(stored.map(|s| TeamMemberRole::from_stored(tmb_id, Some(s))))
}

pub(crate) fn owner_of(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
) -> Result<Option<String>> {
    check_scope(rt, resource_id, team_id)?;
    let owner = d.owners.get(tx, &owner_key(rt, resource_id, team_id)).map_err(err)?;
    Ok(owner.map(str::to_string))
}

/// Resource owners own their resource; the team owner owns everything in the team
pub(crate) fn is_owner(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    p: &Principal,
) -> Result<bool> {
    let Some(tmb_id) = p.tmb_id() else {
        return Ok(false);
    };
    if member_role(d, tx, team_id, tmb_id)? == Some(TeamMemberRole::Owner) {
        return Ok(true);
    }
    Ok(owner_of(d, tx, rt, resource_id, team_id)?.as_deref() == Some(tmb_id))
}

/// A principal's own stored grant as a Permission
pub(crate) fn stored_permission(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    p: &Principal,
) -> Result<Permission> {
    let stored = find(d, tx, rt, resource_id, team_id, p)?;
    Ok(rt.permission(stored, is_owner(d, tx, rt, resource_id, team_id, p)?))
}

pub(crate) fn member_permission(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
    tmb_id: &str,
    groups: &[&str],
    orgs: &[&str],
) -> Result<Permission> {
    let mask = resolve(d, tx, rt, resource_id, team_id, tmb_id, groups, orgs)?;
    let owner = is_owner(d, tx, rt, resource_id, team_id, &Principal::member(tmb_id))?;
    Ok(rt.permission(mask, owner))
}

pub(crate) fn collaborators(
    d: &Dbs,
    tx: &RoTxn,
    rt: ResourceType,
    resource_id: Option<&str>,
    team_id: &str,
) -> Result<Vec<Collaborator>> {
    let table = rt.kind().table();
    list(d, tx, rt, resource_id, team_id)?
        .into_iter()
        .map(|rec| {
            let is_owner = is_owner(d, tx, rt, resource_id, team_id, &rec.principal)?;
            Ok(Collaborator {
                rolled: table.roll_up(rec.permission),
                permission: rec.permission,
                principal: rec.principal,
                is_owner,
            })
        })
        .collect()
}

impl Store {
    /// `find(resourceType, resourceId, teamId, principal)`
    pub fn find(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        p: &Principal,
    ) -> Result<Option<PermissionValue>> {
        self.read(|d, tx| find(d, tx, rt, resource_id, team_id, p))
    }

    pub fn list_for_resource(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
    ) -> Result<Vec<ResourcePermissionRecord>> {
        self.read(|d, tx| list(d, tx, rt, resource_id, team_id))
    }

    pub fn resolve(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        tmb_id: &str,
        groups: &[&str],
        orgs: &[&str],
    ) -> Result<Option<PermissionValue>> {
        self.read(|d, tx| resolve(d, tx, rt, resource_id, team_id, tmb_id, groups, orgs))
    }

    /// Effective permission of a member, owner flag included
    pub fn member_permission(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        tmb_id: &str,
        groups: &[&str],
        orgs: &[&str],
    ) -> Result<Permission> {
        self.read(|d, tx| member_permission(d, tx, rt, resource_id, team_id, tmb_id, groups, orgs))
    }

    pub fn member_role(&self, team_id: &str, tmb_id: &str) -> Result<Option<TeamMemberRole>> {
        self.read(|d, tx| member_role(d, tx, team_id, tmb_id))
    }

    pub fn list_members(&self, team_id: &str) -> Result<Vec<(String, TeamMemberRole)>> {
        check_id("teamId", team_id)?;
        self.read(|d, tx| {
            let mut r = Vec::new();
            for item in d.members.prefix_iter(tx, &member_prefix(team_id)).map_err(err)? {
                let (k, v) = item.map_err(err)?;
                if let [_, tmb] = parse_key(k).as_slice() {
                    r.push((tmb.to_string(), TeamMemberRole::from_stored(tmb, Some(v))));
                }
            }
            Ok(r)
        })
    }

    pub fn owner_of(&self, rt: ResourceType, resource_id: Option<&str>, team_id: &str) -> Result<Option<String>> {
        self.read(|d, tx| owner_of(d, tx, rt, resource_id, team_id))
    }
}
