//! Set difference between a target snapshot and its sources.

use bridge_traits::CollectionItem;
use std::collections::HashSet;

use crate::model::{Diff, DiffDirection, DiffEntry};

/// Compute the mutations that make `target` hold exactly the ids in `source`.
///
/// Presence is decided by id alone; `sort_order` and `kind` are ignored.
/// Additions (in `source` order) precede removals (in `target` order), and an
/// id repeated within one input yields a single entry.
///
/// ```rust
/// use bridge_traits::CollectionItem;
/// use core_sync::{diff, DiffDirection};
///
/// let target = vec![CollectionItem::leaf("1", 0), CollectionItem::leaf("2", 1)];
/// let source = vec![CollectionItem::leaf("2", 0), CollectionItem::leaf("3", 1)];
///
/// let diff = diff(&target, &source);
/// assert_eq!(diff.entries[0].item.id, "3");
/// assert_eq!(diff.entries[0].direction, DiffDirection::Add);
/// assert_eq!(diff.entries[1].item.id, "1");
/// assert_eq!(diff.entries[1].direction, DiffDirection::Remove);
/// ```
pub fn diff(target: &[CollectionItem], source: &[CollectionItem]) -> Diff {
    let mut entries = missing_from(source, target, DiffDirection::Add);
    entries.extend(missing_from(target, source, DiffDirection::Remove));
    Diff::new(entries)
}

/// Items of `present` whose id does not occur in `absent`, labelled `direction`.
fn missing_from(
    present: &[CollectionItem],
    absent: &[CollectionItem],
    direction: DiffDirection,
) -> Vec<DiffEntry> {
    let absent_ids: HashSet<&str> = absent.iter().map(|item| item.id.as_str()).collect();
    let mut emitted = HashSet::new();

    present
        .iter()
        .filter(|item| !absent_ids.contains(item.id.as_str()))
        .filter(|item| emitted.insert(item.id.as_str()))
        .map(|item| DiffEntry::new(item.clone(), direction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::ItemKind;

    fn leaves(ids: &[&str]) -> Vec<CollectionItem> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| CollectionItem::leaf(*id, i as i64))
            .collect()
    }

    fn labelled(diff: &Diff) -> Vec<(String, DiffDirection)> {
        diff.iter()
            .map(|entry| (entry.item.id.clone(), entry.direction))
            .collect()
    }

    #[test]
    fn test_identical_inputs_yield_empty_diff() {
        let items = leaves(&["1", "2", "3"]);
        assert!(diff(&items, &items).is_empty());
    }

    #[test]
    fn test_order_and_fields_are_ignored() {
        let target = leaves(&["1", "2", "3"]);
        let source = vec![
            CollectionItem::new("3", 99, ItemKind::Collection),
            CollectionItem::leaf("1", -4),
            CollectionItem::leaf("2", 7),
        ];

        assert!(diff(&target, &source).is_empty());
    }

    #[test]
    fn test_add_and_remove_labels() {
        let diff = diff(&leaves(&["1", "2"]), &leaves(&["2", "3"]));

        assert_eq!(
            labelled(&diff),
            vec![
                ("3".to_string(), DiffDirection::Add),
                ("1".to_string(), DiffDirection::Remove),
            ]
        );
    }

    #[test]
    fn test_class_order_follows_inputs() {
        let diff = diff(&leaves(&["9", "1", "8"]), &leaves(&["5", "1", "4"]));

        let adds: Vec<_> = diff.additions().map(|e| e.item.id.as_str()).collect();
        let removes: Vec<_> = diff.removals().map(|e| e.item.id.as_str()).collect();
        assert_eq!(adds, vec!["5", "4"]);
        assert_eq!(removes, vec!["9", "8"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff(&[], &[]).is_empty());

        let only_adds = diff(&[], &leaves(&["1", "2"]));
        assert_eq!(only_adds.additions().count(), 2);
        assert_eq!(only_adds.removals().count(), 0);

        let only_removes = diff(&leaves(&["1"]), &[]);
        assert_eq!(
            labelled(&only_removes),
            vec![("1".to_string(), DiffDirection::Remove)]
        );
    }

    #[test]
    fn test_repeated_ids_emit_once() {
        let diff = diff(&leaves(&["1", "1"]), &leaves(&["2", "2", "2"]));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn test_every_difference_classified_and_nothing_else() {
        let target = leaves(&["1", "2", "3", "4"]);
        let source = leaves(&["3", "4", "5", "6", "7"]);
        let diff = diff(&target, &source);

        let source_ids: HashSet<_> = source.iter().map(|i| i.id.as_str()).collect();
        let target_ids: HashSet<_> = target.iter().map(|i| i.id.as_str()).collect();

        for entry in &diff {
            match entry.direction {
                DiffDirection::Add => {
                    assert!(source_ids.contains(entry.item.id.as_str()));
                    assert!(!target_ids.contains(entry.item.id.as_str()));
                }
                DiffDirection::Remove => {
                    assert!(target_ids.contains(entry.item.id.as_str()));
                    assert!(!source_ids.contains(entry.item.id.as_str()));
                }
            }
        }
        assert_eq!(diff.len(), 5);
    }
}
