//! `"<name> v<digits>"` version suffixes on display names.
//!
//! `get_version`, `set_version` and `up_version` are consistent:
//! `up_version(x) == set_version(x, get_version(x) + 1)`.

/// Split a name into its base and numeric version suffix.
///
/// Returns the base, the version and the digit count of the suffix. A suffix
/// that is not all digits is not a version, and the whole name is the base.
fn parse_suffix(name: &str) -> Option<(&str, u32, usize)> {
    let (base, digits) = name.rsplit_once(" v")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let version = digits.parse().ok()?;
    Some((base, version, digits.len()))
}

/// Split `"Shot v002"` into `("Shot", Some(2))`; unversioned names give
/// `(name, None)`.
pub fn split_version(name: &str) -> (&str, Option<u32>) {
    match parse_suffix(name) {
        Some((base, version, _)) => (base, Some(version)),
        None => (name, None),
    }
}

/// Version carried by the name, or 0 when it has none.
pub fn get_version(name: &str) -> u32 {
    split_version(name).1.unwrap_or(0)
}

/// Replace the version suffix, or append one when the name has none.
///
/// The digit width of an existing suffix is kept as a minimum, so
/// `"Shot v002"` set to 3 gives `"Shot v003"`.
pub fn set_version(name: &str, version: u32) -> String {
    match parse_suffix(name) {
        Some((base, _, width)) => format!("{} v{:0width$}", base, version, width = width),
        None => format!("{} v{}", name, version),
    }
}

/// Increment the version suffix (`"Shot"` becomes `"Shot v1"`).
pub fn up_version(name: &str) -> String {
    set_version(name, get_version(name).saturating_add(1))
}
