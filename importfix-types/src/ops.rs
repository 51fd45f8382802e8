use serde::{Deserialize, Serialize};

/// Priority tier for an offered fix.
///
/// Ordering is ordinal: `Low < Medium < High`. Hosts list higher tiers first;
/// there is no finer ranking inside a tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl PriorityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::Low => "low",
            PriorityTier::Medium => "medium",
            PriorityTier::High => "high",
        }
    }
}

/// Which kind of fix was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKindLabel {
    /// Import only; the symbol is already reachable from the project.
    Namespace,
    /// Import plus a reference to another project in the solution.
    Project,
    /// Import plus a reference to an assembly located by the resolver.
    Assembly,
    /// Import plus a package reference.
    Package,
}

impl FixKindLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FixKindLabel::Namespace => "namespace",
            FixKindLabel::Project => "project",
            FixKindLabel::Assembly => "assembly",
            FixKindLabel::Package => "package",
        }
    }

    /// Whether applying this kind adds something to the project's references.
    pub fn adds_reference(self) -> bool {
        !matches!(self, FixKindLabel::Namespace)
    }
}

/// Display tags hosts use to pick an icon or group fixes.
pub mod tags {
    pub const ADD_REFERENCE: &[&str] = &["add_reference"];
    pub const NAMESPACE: &[&str] = &["namespace"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_tiers_are_ordered() {
        assert!(PriorityTier::Low < PriorityTier::Medium);
        assert!(PriorityTier::Medium < PriorityTier::High);
        assert_eq!(PriorityTier::default(), PriorityTier::Medium);
    }

    #[test]
    fn priority_serializes_snake_case() {
        let s = serde_json::to_string(&PriorityTier::High).unwrap();
        assert_eq!(s, "\"high\"");
    }

    #[test]
    fn only_namespace_fixes_skip_references() {
        assert!(!FixKindLabel::Namespace.adds_reference());
        assert!(FixKindLabel::Project.adds_reference());
        assert!(FixKindLabel::Assembly.adds_reference());
        assert!(FixKindLabel::Package.adds_reference());
    }
}
