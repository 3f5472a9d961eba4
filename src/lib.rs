//! Rolebit - bitmask roles and collaborator authorization for multi-tenant teams
//!
//! Permissions are `u32` bitmasks. Each resource kind (team, app, dataset) declares its
//! roles in a static [`RoleTable`]; a stored role value rolls up to the capability bits it
//! implies, and a [`Permission`] answers read/write/manage questions about it.
//!
//! [`check_can_update_permission`] and [`check_can_remove_permission`] decide whether one
//! team member may change or remove another principal's grant. [`Store`] persists grants
//! in LMDB and runs every collaborator change through those checks inside one write
//! transaction.
//!
//! ```no_run
//! use rolebit::{Principal, ResourceType, Store, TEAM_WRITE_ROLE};
//!
//! let store = Store::open("/tmp/rolebit")?;
//! store.create_team("team", "owner")?;
//! store.add_member("team", "alice", Default::default(), None)?;
//! store.update_team_collaborator("team", "owner", &Principal::member("alice"), TEAM_WRITE_ROLE)?;
//! # Ok::<(), rolebit::RolebitError>(())
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod dataset;
mod db;
pub mod error;
pub mod keys;
#[cfg(feature = "server")]
pub mod logging;
pub mod permission;
pub mod principal;
mod read;
pub mod record;
pub mod role;
#[cfg(feature = "server")]
pub mod server;
pub mod team;
mod tx;
pub mod validation;
pub mod value;
mod write;

pub use app::AppPermission;
pub use config::Config;
pub use constants::*;
pub use dataset::DatasetPermission;
pub use db::Store;
pub use error::{Result, RolebitError};
pub use permission::Permission;
pub use principal::{Principal, PrincipalIds};
pub use record::{Collaborator, ResourcePermissionRecord, ResourceType};
pub use role::{CheckboxBehavior, ResourceKind, Role, RoleKey, RoleTable};
pub use team::{TeamMemberRole, TeamPermission};
pub use tx::Tx;
pub use validation::{
    check_can_remove_permission, check_can_update_permission, Decision, DenyReason, Operator, Target,
};
pub use value::PermissionValue;
pub use write::{CollaboratorMode, CollaboratorUpdate, SyncOutcome};
