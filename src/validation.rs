//! Decision rules for changing or removing another principal's grant
//!
//! Rules are evaluated in a fixed order and the first match decides: self-protection,
//! owner supremacy, owner immunity, the manage-gate, then (update only) anti-escalation
//! and peer-manager immunity. A denial is a normal `Ok(false)`, never an error.
//!
//! Removal deliberately skips peer-manager immunity: a manager may evict another
//! manager but may not edit that manager's grant.

use crate::error::{invalid, Result};
use crate::permission::Permission;
use crate::principal::Principal;
use crate::team::TeamMemberRole;

/// The member attempting the change
#[derive(Debug, Clone, Copy)]
pub struct Operator<'a> {
    pub tmb_id: &'a str,
    pub role: TeamMemberRole,
    pub permission: &'a Permission,
}

/// The principal whose grant is changed
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub principal: &'a Principal,
    pub role: TeamMemberRole,
    /// Current permission; required for updates
    pub permission: Option<&'a Permission>,
}

/// Which rule rejected a change. For logs and tests only, never shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    SelfTarget,
    OwnerTarget,
    MissingManage,
    ManageEscalation,
    PeerManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

fn check_operator(op: &Operator) -> Result<()> {
    if op.tmb_id.is_empty() {
        return Err(invalid("missing operator tmbId"));
    }
    Ok(())
}

/// Rules shared by update and remove. `None` means no rule matched yet.
fn common_rules(op: &Operator, target: &Target) -> Option<Decision> {
    if target.principal.tmb_id() == Some(op.tmb_id) {
        return Some(Decision::Deny(DenyReason::SelfTarget));
    }
    if op.role == TeamMemberRole::Owner {
        return Some(Decision::Allow);
    }
    if target.role == TeamMemberRole::Owner {
        return Some(Decision::Deny(DenyReason::OwnerTarget));
    }
    if !op.permission.has_manage_per() {
        return Some(Decision::Deny(DenyReason::MissingManage));
    }
    None
}

pub fn evaluate_update(op: &Operator, target: &Target, update: Option<&Permission>) -> Result<Decision> {
    check_operator(op)?;
    target.principal.validate()?;
    let current = target.permission.ok_or_else(|| invalid("missing target permission"))?;

    if let Some(d) = common_rules(op, target) {
        return Ok(d);
    }
    if let Some(u) = update {
        if u.has_manage_per() != current.has_manage_per() {
            return Ok(Decision::Deny(DenyReason::ManageEscalation));
        }
    }
    if current.has_manage_per() {
        return Ok(Decision::Deny(DenyReason::PeerManager));
    }
    Ok(Decision::Allow)
}

pub fn evaluate_remove(op: &Operator, target: &Target) -> Result<Decision> {
    check_operator(op)?;
    target.principal.validate()?;
    Ok(common_rules(op, target).unwrap_or(Decision::Allow))
}

/// May `op` set `update` (or edit at all, when `None`) on `target`?
pub fn check_can_update_permission(op: &Operator, target: &Target, update: Option<&Permission>) -> Result<bool> {
    let d = evaluate_update(op, target, update)?;
    tracing::debug!(operator = op.tmb_id, target = %target.principal, decision = ?d, "update permission check");
    Ok(d.is_allowed())
}

/// May `op` remove `target`'s grant entirely?
pub fn check_can_remove_permission(op: &Operator, target: &Target) -> Result<bool> {
    let d = evaluate_remove(op, target)?;
    tracing::debug!(operator = op.tmb_id, target = %target.principal, decision = ?d, "remove permission check");
    Ok(d.is_allowed())
}
