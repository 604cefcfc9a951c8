//! Sensitive data marker for automatic redaction
//!
//! Connection credentials end up inside configuration structs that get
//! debug-printed and logged. `Sensitive<T>` keeps them out of that output.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Text printed in place of a sensitive value
pub const MASK: &str = "****** (masked)";

/// Wrapper for sensitive data that masks itself in Debug and Display
///
/// # Example
///
/// ```
/// use rowkeeper_core_types::Sensitive;
///
/// let password = Sensitive::new("hunter2");
/// assert_eq!(format!("{:?}", password), "****** (masked)");
/// assert_eq!(password.expose(), &"hunter2");
/// ```
#[derive(Default)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    ///
    /// Only call this where the secret is actually consumed, e.g. when a
    /// driver is handed its credentials.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Sensitive)
    }
}
