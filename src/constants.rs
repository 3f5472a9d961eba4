//! Permission constants and sentinels
//!
//! These values are persisted in permission records by raw integer. Changing any of
//! them is a data migration, not a code change.

use crate::value::{sum_per, PermissionValue};

const fn bits(v: u32) -> PermissionValue {
    PermissionValue::from_bits(v)
}

// Sentinels
pub const NULL_PERMISSION: PermissionValue = bits(0);
pub const NULL_ROLE: PermissionValue = bits(0);
pub const OWNER_PERMISSION: PermissionValue = bits(u32::MAX);

// Common capability bits (shared layout, declared per kind)
pub const READ_PER: PermissionValue = bits(0b100);
pub const WRITE_PER: PermissionValue = bits(0b010);
pub const MANAGE_PER: PermissionValue = bits(0b001);

pub const READ_ROLE: PermissionValue = READ_PER;
pub const WRITE_ROLE: PermissionValue = WRITE_PER;
pub const MANAGE_ROLE: PermissionValue = MANAGE_PER;

// Rolled-up common values
pub const READ_ROLLED: PermissionValue = READ_PER;
pub const WRITE_ROLLED: PermissionValue = sum_per(&[WRITE_PER, READ_PER]);
pub const MANAGE_ROLLED: PermissionValue = sum_per(&[MANAGE_PER, WRITE_PER, READ_PER]);
pub const DEFAULT_ROLE: PermissionValue = READ_ROLE;

// Team capability bits
pub const TEAM_APP_CREATE_PER: PermissionValue = bits(0b000_1000);
pub const TEAM_DATASET_CREATE_PER: PermissionValue = bits(0b001_0000);
pub const TEAM_APIKEY_CREATE_PER: PermissionValue = bits(0b010_0000);
pub const TEAM_INVITATION_MANAGE_PER: PermissionValue = bits(0b100_0000);

pub const TEAM_READ_ROLE: PermissionValue = READ_ROLE;
pub const TEAM_WRITE_ROLE: PermissionValue = WRITE_ROLE;
pub const TEAM_MANAGE_ROLE: PermissionValue = MANAGE_ROLE;
pub const TEAM_APP_CREATE_ROLE: PermissionValue = TEAM_APP_CREATE_PER;
pub const TEAM_DATASET_CREATE_ROLE: PermissionValue = TEAM_DATASET_CREATE_PER;
pub const TEAM_APIKEY_CREATE_ROLE: PermissionValue = TEAM_APIKEY_CREATE_PER;
pub const TEAM_INVITATION_MANAGE_ROLE: PermissionValue = TEAM_INVITATION_MANAGE_PER;
pub const TEAM_DEFAULT_ROLE: PermissionValue = TEAM_READ_ROLE;

// Rolled-up team values
pub const TEAM_READ_ROLLED: PermissionValue = READ_ROLLED;
pub const TEAM_WRITE_ROLLED: PermissionValue = WRITE_ROLLED;
pub const TEAM_MANAGE_ROLLED: PermissionValue = MANAGE_ROLLED;
pub const TEAM_APP_CREATE_ROLLED: PermissionValue = sum_per(&[TEAM_APP_CREATE_PER, READ_PER, WRITE_PER]);
pub const TEAM_DATASET_CREATE_ROLLED: PermissionValue = sum_per(&[TEAM_DATASET_CREATE_PER, READ_PER, WRITE_PER]);
pub const TEAM_APIKEY_CREATE_ROLLED: PermissionValue = sum_per(&[TEAM_APIKEY_CREATE_PER, READ_PER, WRITE_PER]);
pub const TEAM_INVITATION_MANAGE_ROLLED: PermissionValue = sum_per(&[TEAM_INVITATION_MANAGE_PER, READ_PER, WRITE_PER]);
pub const TEAM_DEFAULT_ROLLED: PermissionValue = TEAM_READ_ROLLED;

/// Super-role seed: every functional team capability without literal ownership
pub const TEAM_ADMIN_PERMISSION: PermissionValue = sum_per(&[
    MANAGE_PER,
    TEAM_APP_CREATE_PER,
    TEAM_DATASET_CREATE_PER,
    TEAM_APIKEY_CREATE_PER,
    TEAM_INVITATION_MANAGE_PER,
    READ_PER,
    WRITE_PER,
]);

// Identifiers are stored with a one-byte length prefix
pub const MAX_ID_LEN: usize = u8::MAX as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_preset_covers_every_team_bit() {
        assert_eq!(TEAM_ADMIN_PERMISSION.bits(), 0b111_1111);
        assert!(TEAM_ADMIN_PERMISSION.contains(TEAM_INVITATION_MANAGE_ROLLED));
        assert!(OWNER_PERMISSION.contains(TEAM_ADMIN_PERMISSION));
    }

    #[test]
    fn rolled_values_match_persisted_layout() {
        assert_eq!(MANAGE_ROLLED.bits(), 0b111);
        assert_eq!(WRITE_ROLLED.bits(), 0b110);
        assert_eq!(TEAM_APP_CREATE_ROLLED.bits(), 0b1110);
        assert_eq!(TEAM_INVITATION_MANAGE_ROLLED.bits(), 0b100_0110);
    }
}
