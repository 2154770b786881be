//! UUID helpers for resource identifiers.
//!
//! Generated identifiers are UUIDv7 so they sort by creation time.

use uuid::Uuid;

use crate::rdf::Uri;
use crate::error::Result;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}

/// Whether a string is a well-formed UUID of any version.
pub fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Mint a resource URI by appending the UUID to a base.
///
/// A separator is inserted when the base does not end in `/` or `#`.
pub fn mint_uri(base: &str, uuid: &Uuid) -> Result<Uri> {
    let sep = if base.ends_with('/') || base.ends_with('#') {
        ""
    } else {
        "/"
    };
    Uri::parse(format!("{}{}{}", base, sep, uuid))
}
