//! Dataset-level permission

use std::ops::Deref;

use serde::Serialize;

use crate::permission::Permission;
use crate::role::dataset_roles;
use crate::value::PermissionValue;

/// Permission over the dataset role table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DatasetPermission(Permission);

impl DatasetPermission {
    pub fn new(role: Option<PermissionValue>, is_owner: bool) -> Self {
        DatasetPermission(Permission::new(dataset_roles(), role, is_owner))
    }

    pub fn into_inner(self) -> Permission {
        self.0
    }
}

impl Deref for DatasetPermission {
    type Target = Permission;

    fn deref(&self) -> &Permission {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn owner_of_dataset_manages() {
        let p = DatasetPermission::new(Some(READ_ROLE), true);
        assert!(p.has_manage_per());
        assert_eq!(p.value(), READ_ROLLED);
    }
}
