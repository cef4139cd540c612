// Rust guideline compliant 2026-02-06

//! Entity identifier checks.
//!
//! Entity UIDs are 32 hexadecimal characters. The sentinel `"0"` denotes the
//! root container and is accepted as well.

/// Length of a regular entity UID.
pub const UID_LENGTH: usize = 32;

/// Checks whether a string looks like an entity UID.
///
/// # Arguments
///
/// * `candidate` - String to check
///
/// # Returns
///
/// True if the string is a valid UID.
#[must_use]
pub fn is_uid(candidate: &str) -> bool {
    if candidate == "0" {
        return true;
    }
    candidate.len() == UID_LENGTH && candidate.bytes().all(|byte| byte.is_ascii_hexdigit())
}

/// Keeps only valid UIDs, preserving order and dropping duplicates.
///
/// # Arguments
///
/// * `uids` - Candidate identifiers
///
/// # Returns
///
/// The valid, unique identifiers in first-seen order.
pub fn valid_uids<I, S>(uids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    uids.into_iter()
        .filter(|uid| is_uid(uid.as_ref()))
        .filter(|uid| seen.insert(uid.as_ref().to_string()))
        .map(|uid| uid.as_ref().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_uid() {
        assert!(is_uid("0"));
        assert!(is_uid("a1b2c3d4e5f60718293a4b5c6d7e8f90"));
        assert!(!is_uid(""));
        assert!(!is_uid("not-a-uid"));
        assert!(!is_uid("a1b2c3d4e5f60718293a4b5c6d7e8f9z"));
    }

    #[test]
    fn test_valid_uids_filters_and_dedups() {
        let uid = "a1b2c3d4e5f60718293a4b5c6d7e8f90";
        let filtered = valid_uids(vec![uid, "", "junk", uid]);
        assert_eq!(filtered, vec![uid.to_string()]);
    }
}
