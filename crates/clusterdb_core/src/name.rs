//! Database and cluster name validation.

use crate::error::{CoreError, CoreResult};

/// Checks that `name` is usable as a single path component.
pub(crate) fn validate(kind: &'static str, name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::invalid_name(kind, name, "must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(CoreError::invalid_name(kind, name, "must not be a relative directory"));
    }
    if name.contains(['/', '\\']) {
        return Err(CoreError::invalid_name(kind, name, "must not contain path separators"));
    }
    if name.contains('\0') {
        return Err(CoreError::invalid_name(kind, name, "must not contain NUL"));
    }
    Ok(())
}
