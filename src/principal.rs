//! Principals: who a permission is granted to

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ID_LEN;
use crate::error::{invalid, Result};

/// A team member, a member group, or an organization
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Principal {
    Member(String),
    Group(String),
    Org(String),
}

impl Principal {
    pub fn member(id: impl Into<String>) -> Self {
        Principal::Member(id.into())
    }

    pub fn group(id: impl Into<String>) -> Self {
        Principal::Group(id.into())
    }

    pub fn org(id: impl Into<String>) -> Self {
        Principal::Org(id.into())
    }

    /// Exactly one identifier must be present and non-empty
    pub fn from_ids(tmb_id: Option<&str>, group_id: Option<&str>, org_id: Option<&str>) -> Result<Self> {
        let p = match (present(tmb_id), present(group_id), present(org_id)) {
            (Some(t), None, None) => Principal::member(t),
            (None, Some(g), None) => Principal::group(g),
            (None, None, Some(o)) => Principal::org(o),
            (None, None, None) => return Err(invalid("missing principal id")),
            _ => return Err(invalid("exactly one of tmbId, groupId, orgId is allowed")),
        };
        p.validate()?;
        Ok(p)
    }

    pub(crate) fn from_tag(tag: &str, id: &str) -> Result<Self> {
        match tag {
            "tmb" => Ok(Principal::member(id)),
            "group" => Ok(Principal::group(id)),
            "org" => Ok(Principal::org(id)),
            _ => Err(invalid(format!("unknown principal tag '{tag}'"))),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Principal::Member(_) => "tmb",
            Principal::Group(_) => "group",
            Principal::Org(_) => "org",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Principal::Member(id) | Principal::Group(id) | Principal::Org(id) => id,
        }
    }

    pub fn tmb_id(&self) -> Option<&str> {
        match self {
            Principal::Member(id) => Some(id),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_id("principal id", self.id())
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tag(), self.id())
    }
}

/// Wire shape: `{ tmbId? , groupId? , orgId? }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl TryFrom<&PrincipalIds> for Principal {
    type Error = crate::error::RolebitError;

    fn try_from(ids: &PrincipalIds) -> Result<Self> {
        Principal::from_ids(ids.tmb_id.as_deref(), ids.group_id.as_deref(), ids.org_id.as_deref())
    }
}

impl From<&Principal> for PrincipalIds {
    fn from(p: &Principal) -> Self {
        let id = Some(p.id().to_string());
        match p {
            Principal::Member(_) => PrincipalIds { tmb_id: id, ..Default::default() },
            Principal::Group(_) => PrincipalIds { group_id: id, ..Default::default() },
            Principal::Org(_) => PrincipalIds { org_id: id, ..Default::default() },
        }
    }
}

impl Serialize for Principal {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        PrincipalIds::from(self).serialize(s)
    }
}

fn present(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

/// Identifiers are non-empty and fit a one-byte length prefix
pub(crate) fn check_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(format!("{what} is empty")));
    }
    if id.len() > MAX_ID_LEN {
        return Err(invalid(format!("{what} longer than {MAX_ID_LEN} bytes")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_id() {
        assert_eq!(Principal::from_ids(Some("t1"), None, None).unwrap(), Principal::member("t1"));
        assert_eq!(Principal::from_ids(None, Some(""), Some("o1")).unwrap(), Principal::org("o1"));
        assert!(Principal::from_ids(None, None, None).is_err());
        assert!(Principal::from_ids(Some("t1"), Some("g1"), None).is_err());
        assert!(Principal::from_ids(Some(&"x".repeat(300)), None, None).is_err());
    }

    #[test]
    fn wire_ids_round_trip() {
        let p = Principal::group("g1");
        let ids = PrincipalIds::from(&p);
        assert_eq!(ids.group_id.as_deref(), Some("g1"));
        assert_eq!(Principal::try_from(&ids).unwrap(), p);
        assert_eq!(p.to_string(), "group:g1");
    }
}
