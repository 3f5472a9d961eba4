//! Transaction wrapper for batched writes

use heed::{RoTxn, RwTxn};

use crate::db::{check_scope, Dbs, Store};
use crate::error::{err, Result};
use crate::keys::{member_key, owner_key, record_key};
use crate::principal::{check_id, Principal};
use crate::read;
use crate::record::{ResourcePermissionRecord, ResourceType};
use crate::team::TeamMemberRole;
use crate::value::PermissionValue;

/// Write transaction. Reads through it see its own uncommitted writes.
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: &'e Dbs,
}

impl<'e> Tx<'e> {
    #[inline]
    pub(crate) fn new(store: &'e Store) -> Result<Self> {
        Ok(Tx {
            txn: store.env().write_txn().map_err(err)?,
            dbs: store.dbs(),
        })
    }

    #[inline]
    pub(crate) fn dbs(&self) -> &'e Dbs {
        self.dbs
    }

    #[inline]
    pub(crate) fn ro(&self) -> &RoTxn<'e> {
        &self.txn
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.dbs.records.clear(&mut self.txn).map_err(err)?;
        self.dbs.members.clear(&mut self.txn).map_err(err)?;
        self.dbs.owners.clear(&mut self.txn).map_err(err)
    }

    // ------------------------------------------------------------------------
    // Permission records
    // ------------------------------------------------------------------------

    #[inline]
    pub fn find(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        p: &Principal,
    ) -> Result<Option<PermissionValue>> {
        read::find(self.dbs, &self.txn, rt, resource_id, team_id, p)
    }

    /// Set a principal's grant exactly (replaces any existing value)
    pub fn upsert(
        &mut self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        p: &Principal,
        value: PermissionValue,
    ) -> Result<()> {
        check_scope(rt, resource_id, team_id)?;
        p.validate()?;
        let k = record_key(rt, resource_id, team_id, p);
        self.dbs.records.put(&mut self.txn, &k, &value.bits()).map_err(err)
    }

    /// Delete a grant; returns whether one existed
    pub fn delete(
        &mut self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
        p: &Principal,
    ) -> Result<bool> {
        check_scope(rt, resource_id, team_id)?;
        p.validate()?;
        let k = record_key(rt, resource_id, team_id, p);
        self.dbs.records.delete(&mut self.txn, &k).map_err(err)
    }

    #[inline]
    pub fn list(
        &self,
        rt: ResourceType,
        resource_id: Option<&str>,
        team_id: &str,
    ) -> Result<Vec<ResourcePermissionRecord>> {
        read::list(self.dbs, &self.txn, rt, resource_id, team_id)
    }

    // ------------------------------------------------------------------------
    // Team membership and ownership
    // ------------------------------------------------------------------------

    pub fn set_member(&mut self, team_id: &str, tmb_id: &str, role: TeamMemberRole) -> Result<()> {
        check_id("teamId", team_id)?;
        check_id("tmbId", tmb_id)?;
        self.dbs
            .members
            .put(&mut self.txn, &member_key(team_id, tmb_id), role.as_str())
            .map_err(err)
    }

    #[inline]
    pub fn member_role(&self, team_id: &str, tmb_id: &str) -> Result<Option<TeamMemberRole>> {
        read::member_role(self.dbs, &self.txn, team_id, tmb_id)
    }

    /// Remove a member together with their team-level grant
    pub fn remove_member(&mut self, team_id: &str, tmb_id: &str) -> Result<bool> {
        check_id("teamId", team_id)?;
        check_id("tmbId", tmb_id)?;
        self.delete(ResourceType::Team, None, team_id, &Principal::member(tmb_id))?;
        self.dbs.members.delete(&mut self.txn, &member_key(team_id, tmb_id)).map_err(err)
    }

    pub fn set_owner(&mut self, rt: ResourceType, resource_id: Option<&str>, team_id: &str, tmb_id: &str) -> Result<()> {
        check_scope(rt, resource_id, team_id)?;
        check_id("tmbId", tmb_id)?;
        self.dbs
            .owners
            .put(&mut self.txn, &owner_key(rt, resource_id, team_id), tmb_id)
            .map_err(err)
    }

    #[inline]
    pub fn owner_of(&self, rt: ResourceType, resource_id: Option<&str>, team_id: &str) -> Result<Option<String>> {
        read::owner_of(self.dbs, &self.txn, rt, resource_id, team_id)
    }
}

impl Store {
    /// Run multiple operations in a single transaction. Nothing is written unless `f`
    /// returns `Ok`.
    #[inline]
    pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self)?;
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }
}
