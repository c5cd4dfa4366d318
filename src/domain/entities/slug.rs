//! Slug allocation value types.

use serde::Serialize;
use std::fmt;

/// A proposed slug derived from a base by suffix iteration.
///
/// Iterating yields `base`, `base-1`, `base-2`, ... in that order. The
/// sequence is deterministic so repeated allocations against the same storage
/// state probe candidates identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCandidate {
    base: String,
    attempt: usize,
}

impl SlugCandidate {
    /// Starts the sequence at the base itself.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            attempt: 0,
        }
    }

    /// Starts the sequence at `base-1`, skipping the base.
    pub fn suffixed(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            attempt: 1,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// The slug for the current attempt.
    pub fn value(&self) -> String {
        match self.attempt {
            0 => self.base.clone(),
            n => format!("{}-{}", self.base, n),
        }
    }
}

impl Iterator for SlugCandidate {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.value();
        self.attempt = self.attempt.checked_add(1)?;
        Some(value)
    }
}

/// Result of a single existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugAvailability {
    Available,
    Taken,
}

/// Where the finalized slug came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugOrigin {
    /// Produced by the random token generator, never probed.
    Generated,
    /// The caller's slug, confirmed free.
    Requested,
    /// A suffixed alternative to a taken caller slug.
    Derived,
}

impl fmt::Display for SlugOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlugOrigin::Generated => "generated",
            SlugOrigin::Requested => "requested",
            SlugOrigin::Derived => "derived",
        };
        f.write_str(s)
    }
}

/// The slug the allocator settled on, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedSlug {
    pub value: String,
    pub origin: SlugOrigin,
    /// Existence checks performed to reach this slug.
    pub probes: usize,
}

impl FinalizedSlug {
    pub fn new(value: impl Into<String>, origin: SlugOrigin, probes: usize) -> Self {
        Self {
            value: value.into(),
            origin,
            probes,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_sequence_starts_at_base() {
        let seq: Vec<String> = SlugCandidate::new("foo").take(4).collect();
        assert_eq!(seq, vec!["foo", "foo-1", "foo-2", "foo-3"]);
    }

    #[test]
    fn test_suffixed_skips_base() {
        let seq: Vec<String> = SlugCandidate::suffixed("abc").take(2).collect();
        assert_eq!(seq, vec!["abc-1", "abc-2"]);
    }

    #[test]
    fn test_candidate_tracks_attempt() {
        let mut candidate = SlugCandidate::new("x");
        assert_eq!(candidate.attempt(), 0);
        candidate.next();
        candidate.next();
        assert_eq!(candidate.attempt(), 2);
        assert_eq!(candidate.value(), "x-2");
        assert_eq!(candidate.base(), "x");
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(SlugOrigin::Derived.to_string(), "derived");
        assert_eq!(
            serde_json::to_value(SlugOrigin::Generated).unwrap(),
            serde_json::json!("generated")
        );
    }
}
