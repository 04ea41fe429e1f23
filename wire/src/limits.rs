//! Configurable limits for bounded decoding.

/// Stream-level limits enforced while decoding.
///
/// Length fields read from the stream are checked against these limits
/// before anything is allocated for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum stream size in bytes, header included.
    pub max_stream_bytes: usize,

    /// Maximum byte length of an object name.
    pub max_name_bytes: usize,

    /// Maximum number of indices in a single face, line or points element.
    pub max_element_indices: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // 1 GiB covers very large scanned meshes
            max_stream_bytes: 1 << 30,
            max_name_bytes: 4096,
            max_element_indices: 1 << 20,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_stream_bytes: 64 * 1024,
            max_name_bytes: 64,
            max_element_indices: 256,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_stream_bytes: usize::MAX,
            max_name_bytes: usize::MAX,
            max_element_indices: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_stream_bytes < default_limits.max_stream_bytes);
        assert!(test_limits.max_name_bytes < default_limits.max_name_bytes);
        assert!(test_limits.max_element_indices < default_limits.max_element_indices);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_stream_bytes, usize::MAX);
        assert_eq!(limits.max_name_bytes, usize::MAX);
        assert_eq!(limits.max_element_indices, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_name_bytes, 64);
    }
}
