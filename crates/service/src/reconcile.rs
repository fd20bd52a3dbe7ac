//! Keyed set reconciliation for collection-replace submits.
//!
//! The Web API replaces the whole collection in one call; the three-way
//! split computed here only feeds user-facing counts ("N added, M changed,
//! K removed") and the submit log, never three separate network calls.

use std::collections::{HashMap, HashSet};

use models::ServiceTypeEntry;
use tracing::debug;

/// Disjoint classification of an edited list against its original snapshot.
///
/// Every name from the original is either unchanged (absent here), changed,
/// or removed; names only in the edited list are added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub to_add: Vec<ServiceTypeEntry>,
    pub to_change: Vec<ServiceTypeEntry>,
    pub to_remove: Vec<String>,
}

impl ReconciliationResult {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_change.is_empty() && self.to_remove.is_empty()
    }

    /// Human-readable counts for notifications and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} changed, {} removed",
            self.to_add.len(),
            self.to_change.len(),
            self.to_remove.len()
        )
    }
}

/// Diff `current` against `original` by `name`.
///
/// Result lists are sorted by name (ordinal, case-sensitive) so the output is
/// deterministic and diff-friendly. Precondition: names within `current` are
/// unique; duplicate keys leave the classification unspecified.
pub fn reconcile(original: &[ServiceTypeEntry], current: &[ServiceTypeEntry]) -> ReconciliationResult {
    let original_by_name: HashMap<&str, &ServiceTypeEntry> =
        original.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut result = ReconciliationResult::default();
    for entry in current {
        match original_by_name.get(entry.name.as_str()) {
            None => result.to_add.push(entry.clone()),
            Some(orig) if entry.differs_from(orig) => result.to_change.push(entry.clone()),
            Some(_) => {}
        }
    }

    let current_names: HashSet<&str> = current.iter().map(|e| e.name.as_str()).collect();
    for entry in original {
        if !current_names.contains(entry.name.as_str()) {
            result.to_remove.push(entry.name.clone());
        }
    }

    result.to_add.sort_by(|a, b| a.name.cmp(&b.name));
    result.to_change.sort_by(|a, b| a.name.cmp(&b.name));
    result.to_remove.sort();

    debug!(
        added = result.to_add.len(),
        changed = result.to_change.len(),
        removed = result.to_remove.len(),
        "reconciled catalog lists"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, description: &str) -> ServiceTypeEntry {
        ServiceTypeEntry {
            name: name.into(),
            title: None,
            description: description.into(),
            tags: vec!["topology".into()],
        }
    }

    #[test]
    fn identical_lists_reconcile_to_nothing() {
        let list = vec![entry("a", "x"), entry("b", "y"), entry("c", "z")];
        let r = reconcile(&list, &list);
        assert!(r.is_empty());
    }

    #[test]
    fn add_change_remove_are_classified() {
        let original = vec![entry("a", "x"), entry("b", "y")];
        let current = vec![entry("a", "X"), entry("c", "z")];
        let r = reconcile(&original, &current);
        assert_eq!(r.to_add, vec![entry("c", "z")]);
        assert_eq!(r.to_change, vec![entry("a", "X")]);
        assert_eq!(r.to_remove, vec!["b".to_string()]);
    }

    #[test]
    fn title_change_alone_is_a_change() {
        let original = vec![entry("a", "x")];
        let mut changed = entry("a", "x");
        changed.title = Some("Service A".into());
        let r = reconcile(&original, &[changed.clone()]);
        assert_eq!(r.to_change, vec![changed]);
        assert!(r.to_add.is_empty());
        assert!(r.to_remove.is_empty());
    }

    #[test]
    fn tag_differences_are_not_changes() {
        let original = vec![entry("a", "x")];
        let mut current = entry("a", "x");
        current.tags = vec!["poem".into()];
        let r = reconcile(&original, &[current]);
        assert!(r.is_empty());
    }

    #[test]
    fn results_are_sorted_by_name() {
        let original = vec![entry("d", "4"), entry("b", "2")];
        let current = vec![entry("c", "3"), entry("a", "1")];
        let r = reconcile(&original, &current);
        let added: Vec<&str> = r.to_add.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(added, vec!["a", "c"]);
        assert_eq!(r.to_remove, vec!["b".to_string(), "d".to_string()]);
    }

    #[test]
    fn removing_the_removed_is_idempotent() {
        let original = vec![entry("a", "x"), entry("b", "y")];
        let first = reconcile(&original, &[entry("a", "x")]);
        assert_eq!(first.to_remove, vec!["b".to_string()]);
        // submit succeeded; reconciling the surviving list against itself is clean
        let survivors = vec![entry("a", "x")];
        let second = reconcile(&survivors, &survivors);
        assert!(second.is_empty());
    }

    #[test]
    fn summary_counts() {
        let original = vec![entry("a", "x"), entry("b", "y")];
        let current = vec![entry("a", "X"), entry("c", "z")];
        assert_eq!(reconcile(&original, &current).summary(), "1 added, 1 changed, 1 removed");
    }
}
