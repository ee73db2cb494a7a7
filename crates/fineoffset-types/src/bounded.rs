//! Length-bounded owned strings for persisted credential fields.

use core::fmt;
use core::ops::Deref;

/// An owned string holding at most `N` bytes.
///
/// Longer input is truncated on construction, at the last UTF-8 character
/// boundary that fits. The bound therefore holds for every value of this
/// type, including ones produced by deserialization.
///
/// ```
/// use fineoffset_types::BoundedString;
///
/// let id: BoundedString<10> = BoundedString::new("IAMSTERDAM123");
/// assert_eq!(id.as_str(), "IAMSTERDAM");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedString<const N: usize>(String);

impl<const N: usize> BoundedString<N> {
    /// Maximum number of bytes this string holds.
    pub const MAX_LEN: usize = N;

    /// Create a bounded string, truncating `value` to fit.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(truncate(value, N).to_string())
    }

    /// Returns the string contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn truncate(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> From<&str> for BoundedString<N> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for BoundedString<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for BoundedString<N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}
