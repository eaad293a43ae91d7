//! Closed-set enum types for the canonical issue model.
//!
//! Each enum has:
//! - Custom Serialize (as snake_case or kebab-case string, matching the wire format named in
//!   the external interfaces)
//! - Custom Deserialize (known variants + catch-all Custom/Other(String))
//! - `as_str()`, `is_default()`, `Display` impl
//!
//! The `Custom(String)` fallback exists so a row written by a future schema version (or a
//! legacy upstream emitting an unrecognized token) deserializes without failing; see
//! `Status`'s handling of legacy `blocked` values in the markdown/beads adapters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + a Custom(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, custom_variant = $custom_variant:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            $custom_variant(String),
        }

        impl $name {
            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::$custom_variant(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Returns `true` if this is a built-in (non-custom) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::$custom_variant(_))
            }

            /// Returns `true` if this is a known valid variant or any non-empty custom string.
            pub fn is_valid(&self) -> bool {
                match self {
                    Self::$custom_variant(s) => !s.is_empty(),
                    _ => true,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s.as_str()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str => Self::$variant, )+
                    other => Self::$custom_variant(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                // Check known variants first to avoid allocation in common case.
                match s.as_str() {
                    $( $str => Self::$variant, )+
                    _ => Self::$custom_variant(s),
                }
            }
        }
    };
}

// ===========================================================================
// Status
// ===========================================================================
//
// Restricted to the three stored states the canonical model recognizes (§3.1).
// `blocked` is derived by the DAG oracle (C3), never stored here -- a legacy file
// or beads row carrying `status: blocked` is normalized to `Open` plus a `blocks`
// edge by the adapter that reads it (see beads-template's markdown adapter and
// beads-upstream's beads adapter), not by this type.

define_enum! {
    /// Current state of an issue.
    Status, default = Open, custom_variant = Custom,
    variants: [
        (Open, "open"),
        (InProgress, "in_progress"),
        (Closed, "closed"),
    ]
}

impl Status {
    /// Whether an issue in this status is eligible to be "ready" at all
    /// (closed issues never are; DAG oracle still checks blockers on top of this).
    pub fn is_open_ended(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

// ===========================================================================
// IssueType
// ===========================================================================

define_enum! {
    /// Categorises the kind of work.
    IssueType, default = Task, custom_variant = Custom,
    variants: [
        (Task, "task"),
        (Bug, "bug"),
        (Feature, "feature"),
        (Epic, "epic"),
        (Chore, "chore"),
    ]
}

impl IssueType {
    /// Normalises common upstream aliases to their canonical form.
    pub fn normalize(&self) -> Self {
        match self.as_str() {
            "enhancement" | "feat" => Self::Feature,
            "defect" => Self::Bug,
            _ => self.clone(),
        }
    }
}

// ===========================================================================
// DependencyType
// ===========================================================================

define_enum! {
    /// Relationship type between issues.
    DependencyType, default = Blocks, custom_variant = Custom,
    variants: [
        (Blocks, "blocks"),
        (ParentChild, "parent-child"),
        (Related, "related"),
    ]
}

impl DependencyType {
    /// Only `Blocks` edges participate in readiness/cycle checks (I3, I4).
    pub fn affects_ready_work(&self) -> bool {
        matches!(self, Self::Blocks)
    }
}

// ===========================================================================
// MilestoneState
// ===========================================================================

define_enum! {
    /// Current state of a milestone.
    MilestoneState, default = Open, custom_variant = Custom,
    variants: [
        (Open, "open"),
        (Closed, "closed"),
    ]
}

// ===========================================================================
// SyncDirection
// ===========================================================================

define_enum! {
    /// One of the arrows named across the sync orchestrator's four reconciliation axes
    /// plus comment mirroring (SPEC_FULL §3.1.1, §4.7).
    SyncDirection, default = BeadsToFile, custom_variant = Custom,
    variants: [
        (BeadsToFile, "beads_to_file"),
        (FileToBeads, "file_to_beads"),
        (GithubToCanonical, "github_to_canonical"),
        (CanonicalToGithub, "canonical_to_github"),
        (LinearToCanonical, "linear_to_canonical"),
        (CanonicalToLinearComment, "canonical_to_linear_comment"),
    ]
}

// ===========================================================================
// SyncOutcome
// ===========================================================================

define_enum! {
    /// The outcome recorded on a `SyncEvent` ledger row (§3.1, §4.7, §7).
    SyncOutcome, default = Pending, custom_variant = Custom,
    variants: [
        (Pending, "pending"),
        (Applied, "applied"),
        (Duplicate, "duplicate"),
        (Stale, "stale"),
        (Ignored, "ignored"),
        (Failed, "failed"),
    ]
}

// ===========================================================================
// Upstream
// ===========================================================================

define_enum! {
    /// One of the four upstreams this system reconciles against.
    Upstream, default = Beads, custom_variant = Custom,
    variants: [
        (Beads, "beads"),
        (File, "file"),
        (Github, "github"),
        (Linear, "linear"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_default_is_open() {
        assert_eq!(Status::default(), Status::Open);
        assert!(Status::Open.is_default());
        assert!(!Status::Closed.is_default());
    }

    #[test]
    fn status_roundtrip_serde() {
        let s = Status::InProgress;
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn status_legacy_blocked_becomes_custom_not_a_variant() {
        // `blocked` is not a constructible Status variant -- it round-trips only
        // through the Custom fallback, and callers (adapters) are responsible for
        // normalizing it to `Open` + a `blocks` edge before it ever reaches storage.
        let s: Status = "blocked".into();
        assert_eq!(s, Status::Custom("blocked".into()));
    }

    #[test]
    fn dependency_type_as_str() {
        assert_eq!(DependencyType::ParentChild.as_str(), "parent-child");
        assert_eq!(DependencyType::Related.as_str(), "related");
    }

    #[test]
    fn dependency_type_affects_ready_work() {
        assert!(DependencyType::Blocks.affects_ready_work());
        assert!(!DependencyType::ParentChild.affects_ready_work());
        assert!(!DependencyType::Related.affects_ready_work());
    }

    #[test]
    fn issue_type_normalize() {
        assert_eq!(
            IssueType::Custom("enhancement".into()).normalize(),
            IssueType::Feature
        );
        assert_eq!(IssueType::Bug.normalize(), IssueType::Bug);
    }

    #[test]
    fn sync_outcome_roundtrip() {
        let o = SyncOutcome::Duplicate;
        let json = serde_json::to_string(&o).unwrap();
        assert_eq!(json, r#""duplicate""#);
        assert_eq!(serde_json::from_str::<SyncOutcome>(&json).unwrap(), o);
    }

    #[test]
    fn upstream_custom_roundtrip() {
        let json = r#""some_future_upstream""#;
        let u: Upstream = serde_json::from_str(json).unwrap();
        assert_eq!(u, Upstream::Custom("some_future_upstream".into()));
        assert_eq!(serde_json::to_string(&u).unwrap(), json);
    }
}
