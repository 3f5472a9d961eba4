//! Collaborator change decisions
//!
//! Exercises the update/remove rules directly on in-memory permissions, including every
//! role combination for the blanket properties.

use rolebit::{
    check_can_remove_permission, check_can_update_permission, Operator, Permission, Principal, Target,
    TeamMemberRole, TeamPermission, OWNER_PERMISSION, TEAM_APP_CREATE_ROLE, TEAM_MANAGE_ROLE,
    TEAM_READ_ROLE, TEAM_WRITE_ROLE,
};

const ROLES: [TeamMemberRole; 3] = [TeamMemberRole::Owner, TeamMemberRole::Admin, TeamMemberRole::Member];

fn team(role: rolebit::PermissionValue) -> Permission {
    TeamPermission::new(Some(role), false).into_inner()
}

fn permissions() -> Vec<Permission> {
    vec![
        team(TEAM_READ_ROLE),
        team(TEAM_WRITE_ROLE),
        team(TEAM_MANAGE_ROLE),
        team(TEAM_APP_CREATE_ROLE),
        TeamPermission::new(None, true).into_inner(),
    ]
}

fn update(
    op_id: &str,
    op_role: TeamMemberRole,
    op_per: &Permission,
    target: &Principal,
    target_role: TeamMemberRole,
    target_per: &Permission,
    new: Option<&Permission>,
) -> bool {
    check_can_update_permission(
        &Operator { tmb_id: op_id, role: op_role, permission: op_per },
        &Target { principal: target, role: target_role, permission: Some(target_per) },
        new,
    )
    .unwrap()
}

fn remove(
    op_id: &str,
    op_role: TeamMemberRole,
    op_per: &Permission,
    target: &Principal,
    target_role: TeamMemberRole,
    target_per: &Permission,
) -> bool {
    check_can_remove_permission(
        &Operator { tmb_id: op_id, role: op_role, permission: op_per },
        &Target { principal: target, role: target_role, permission: Some(target_per) },
    )
    .unwrap()
}

// ============================================================================
// Blanket properties
// ============================================================================

#[test]
fn nobody_changes_their_own_grant() {
    let me = Principal::member("1");
    for op_role in ROLES {
        for target_role in ROLES {
            for op_per in permissions() {
                for target_per in permissions() {
                    assert!(!update("1", op_role, &op_per, &me, target_role, &target_per, None));
                    assert!(!update("1", op_role, &op_per, &me, target_role, &target_per, Some(&op_per)));
                    assert!(!remove("1", op_role, &op_per, &me, target_role, &target_per));
                }
            }
        }
    }
}

#[test]
fn owner_passes_every_check_on_others() {
    let other = Principal::member("2");
    let owner = TeamPermission::new(None, true).into_inner();
    for target_role in ROLES {
        for target_per in permissions() {
            for new in permissions() {
                assert!(update("1", TeamMemberRole::Owner, &owner, &other, target_role, &target_per, Some(&new)));
            }
            assert!(update("1", TeamMemberRole::Owner, &owner, &other, target_role, &target_per, None));
            assert!(remove("1", TeamMemberRole::Owner, &owner, &other, target_role, &target_per));
        }
    }
}

#[test]
fn owner_target_is_immune_to_non_owners() {
    let owner = Principal::member("9");
    let target_per = TeamPermission::new(None, true).into_inner();
    for op_role in [TeamMemberRole::Admin, TeamMemberRole::Member] {
        for op_per in permissions().into_iter().filter(|p| !p.is_owner()) {
            assert!(!update("1", op_role, &op_per, &owner, TeamMemberRole::Owner, &target_per, None));
            assert!(!remove("1", op_role, &op_per, &owner, TeamMemberRole::Owner, &target_per));
        }
    }
}

#[test]
fn manage_gate_blocks_everyone_without_manage() {
    let target = Principal::member("2");
    let member = team(TEAM_READ_ROLE);
    for op_per in [team(TEAM_READ_ROLE), team(TEAM_WRITE_ROLE), team(TEAM_APP_CREATE_ROLE)] {
        assert!(!update("1", TeamMemberRole::Admin, &op_per, &target, TeamMemberRole::Member, &member, None));
        assert!(!remove("1", TeamMemberRole::Member, &op_per, &target, TeamMemberRole::Member, &member));
    }
}

#[test]
fn managers_cannot_grant_or_revoke_manage() {
    let manager = team(TEAM_MANAGE_ROLE);
    let target = Principal::member("2");
    let member = team(TEAM_READ_ROLE);

    assert!(!update("1", TeamMemberRole::Admin, &manager, &target, TeamMemberRole::Member, &member, Some(&manager)));
    // Changing non-manage bits is fine
    let writer = team(TEAM_WRITE_ROLE);
    assert!(update("1", TeamMemberRole::Admin, &manager, &target, TeamMemberRole::Member, &member, Some(&writer)));
}

#[test]
fn peer_manager_can_be_removed_but_not_edited() {
    let manager = team(TEAM_MANAGE_ROLE);
    let peer = Principal::member("2");
    assert!(!update("1", TeamMemberRole::Admin, &manager, &peer, TeamMemberRole::Admin, &manager, None));
    assert!(!update("1", TeamMemberRole::Admin, &manager, &peer, TeamMemberRole::Admin, &manager, Some(&manager)));
    assert!(remove("1", TeamMemberRole::Admin, &manager, &peer, TeamMemberRole::Admin, &manager));
}

#[test]
fn owner_value_alone_implies_ownership() {
    let p = TeamPermission::new(Some(OWNER_PERMISSION), false);
    assert!(p.is_owner());
    assert!(p.has_manage_per());
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn scenario_admin_edits_member() {
    let admin = team(TEAM_MANAGE_ROLE);
    let member = team(TEAM_READ_ROLE);
    let t = Principal::member("4");
    assert!(update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &member, None));
}

#[test]
fn scenario_admin_edits_admin() {
    let admin = team(TEAM_MANAGE_ROLE);
    let t = Principal::member("3");
    assert!(!update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Admin, &admin, None));
}

#[test]
fn scenario_admin_promotes_member_to_manage() {
    let admin = team(TEAM_MANAGE_ROLE);
    let member = team(TEAM_READ_ROLE);
    let t = Principal::member("4");
    assert!(!update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &member, Some(&admin)));
}

#[test]
fn scenario_owner_edits_and_removes_admin() {
    let owner = TeamPermission::new(None, true).into_inner();
    let admin = team(TEAM_MANAGE_ROLE);
    let t = Principal::member("2");
    assert!(update("1", TeamMemberRole::Owner, &owner, &t, TeamMemberRole::Admin, &admin, None));
    assert!(remove("1", TeamMemberRole::Owner, &owner, &t, TeamMemberRole::Admin, &admin));
}

#[test]
fn scenario_admin_touches_owner() {
    let owner = TeamPermission::new(None, true).into_inner();
    let admin = team(TEAM_MANAGE_ROLE);
    let t = Principal::member("1");
    assert!(!update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Owner, &owner, None));
    assert!(!remove("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Owner, &owner));
}

#[test]
fn scenario_member_without_manage() {
    let member = team(TEAM_READ_ROLE);
    let t = Principal::member("5");
    assert!(!update("4", TeamMemberRole::Member, &member, &t, TeamMemberRole::Member, &member, None));
}

// ============================================================================
// Groups and orgs
// ============================================================================

#[test]
fn group_and_org_targets_follow_member_rules() {
    let admin = team(TEAM_MANAGE_ROLE);
    let member = team(TEAM_READ_ROLE);
    for t in [Principal::group("g"), Principal::org("o")] {
        assert!(update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &member, None));
        assert!(!update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &member, Some(&admin)));
        assert!(!update("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &admin, None));
        assert!(remove("2", TeamMemberRole::Admin, &admin, &t, TeamMemberRole::Member, &admin));
    }
}

#[test]
fn missing_target_permission_is_an_input_error() {
    let admin = team(TEAM_MANAGE_ROLE);
    let t = Principal::member("4");
    let r = check_can_update_permission(
        &Operator { tmb_id: "2", role: TeamMemberRole::Admin, permission: &admin },
        &Target { principal: &t, role: TeamMemberRole::Member, permission: None },
        None,
    );
    assert!(matches!(r, Err(rolebit::RolebitError::InvalidInput(_))));
}
