//! Length-prefixed key encoding for LMDB storage.
//!
//! All keys are encoded as: [len1][bytes1][len2][bytes2]...
//! - No delimiters, no escaping, any bytes allowed
//! - Prefix scans work on whole leading parts
//! - Each part is at most 255 bytes

use crate::principal::Principal;
use crate::record::ResourceType;

/// Build a length-prefixed key from parts
///
/// # Example
/// ```
/// let key = rolebit::keys::build_key(&["app", "a1"]);
/// assert_eq!(key, b"\x03app\x02a1");
/// ```
#[inline]
pub fn build_key(parts: &[&str]) -> Vec<u8> {
    let total_len: usize = parts.iter().map(|p| 1 + p.len()).sum();
    let mut key = Vec::with_capacity(total_len);
    for part in parts {
        debug_assert!(part.len() <= u8::MAX as usize);
        key.push(part.len() as u8);
        key.extend_from_slice(part.as_bytes());
    }
    key
}

/// Parse a length-prefixed key into parts. Malformed trailing bytes are ignored.
pub fn parse_key(bytes: &[u8]) -> Vec<&str> {
    let mut parts = Vec::with_capacity(5);
    let mut i = 0;
    while i < bytes.len() {
        let len = bytes[i] as usize;
        if i + 1 + len > bytes.len() {
            break;
        }
        match std::str::from_utf8(&bytes[i + 1..i + 1 + len]) {
            Ok(part) => parts.push(part),
            Err(_) => break,
        }
        i += 1 + len;
    }
    parts
}

// ============================================================================
// Record keys: [type][resource_id][team_id][principal_tag][principal_id]
// ============================================================================

/// Team-level records have no resource id; they use an empty part
#[inline]
pub fn record_prefix(rt: ResourceType, resource_id: Option<&str>, team_id: &str) -> Vec<u8> {
    build_key(&[rt.as_str(), resource_id.unwrap_or(""), team_id])
}

#[inline]
pub fn record_key(rt: ResourceType, resource_id: Option<&str>, team_id: &str, p: &Principal) -> Vec<u8> {
    build_key(&[rt.as_str(), resource_id.unwrap_or(""), team_id, p.tag(), p.id()])
}

/// Decode the principal of a record key
pub fn record_principal(bytes: &[u8]) -> Option<Principal> {
    match parse_key(bytes).as_slice() {
        [_, _, _, tag, id] => Principal::from_tag(tag, id).ok(),
        _ => None,
    }
}

// ============================================================================
// Member and owner keys
// ============================================================================

#[inline]
pub fn member_key(team_id: &str, tmb_id: &str) -> Vec<u8> {
    build_key(&[team_id, tmb_id])
}

#[inline]
pub fn member_prefix(team_id: &str) -> Vec<u8> {
    build_key(&[team_id])
}

/// Same scope layout as record prefixes; a team's own owner uses the empty resource part
#[inline]
pub fn owner_key(rt: ResourceType, resource_id: Option<&str>, team_id: &str) -> Vec<u8> {
    record_prefix(rt, resource_id, team_id)
}
