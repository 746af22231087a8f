//! Sibling ordering.
//!
//! One primitive serves both orderings in the hierarchy: accounts within a
//! definition (float index) and definitions within a grouping (integer
//! index). After every operation the indices of a list are exactly
//! `0..len` in position order.

use std::cmp::Ordering;

/// Position type stored on an ordered record.
pub trait SiblingIndex: Copy {
    /// The index for a 0-based position.
    fn from_position(position: usize) -> Self;

    /// Exact equality, used to decide whether a record needs a write.
    fn same(self, other: Self) -> bool;

    /// Total order used when loading a list.
    fn order(self, other: Self) -> Ordering;
}

impl SiblingIndex for i32 {
    fn from_position(position: usize) -> Self {
        Self::try_from(position).unwrap_or(Self::MAX)
    }

    fn same(self, other: Self) -> bool {
        self == other
    }

    fn order(self, other: Self) -> Ordering {
        self.cmp(&other)
    }
}

impl SiblingIndex for i64 {
    fn from_position(position: usize) -> Self {
        Self::try_from(position).unwrap_or(Self::MAX)
    }

    fn same(self, other: Self) -> bool {
        self == other
    }

    fn order(self, other: Self) -> Ordering {
        self.cmp(&other)
    }
}

impl SiblingIndex for f64 {
    fn from_position(position: usize) -> Self {
        Self::from(u32::try_from(position).unwrap_or(u32::MAX))
    }

    fn same(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }

    fn order(self, other: Self) -> Ordering {
        self.total_cmp(&other)
    }
}

/// Field accessors that let one list type order any record.
pub struct SiblingAccess<T, K, P, I> {
    /// Record identity.
    pub key: fn(&T) -> K,
    /// Current parent.
    pub parent: fn(&T) -> Option<P>,
    /// Replaces the parent.
    pub set_parent: fn(&mut T, Option<P>),
    /// Current position.
    pub index: fn(&T) -> I,
    /// Replaces the position.
    pub set_index: fn(&mut T, I),
}

impl<T, K, P, I> Clone for SiblingAccess<T, K, P, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K, P, I> Copy for SiblingAccess<T, K, P, I> {}

/// Result of a reorder: the new list and the records that need a write.
#[derive(Debug, Clone, PartialEq)]
pub struct Reordered<T, K> {
    /// Siblings in position order.
    pub siblings: Vec<T>,
    /// Keys of records whose index or parent changed, in position order.
    pub changed: Vec<K>,
}

/// The ordered children of one parent.
pub struct OrderedSiblingList<T, K, P, I> {
    parent: P,
    items: Vec<T>,
    access: SiblingAccess<T, K, P, I>,
}

impl<T, K, P, I> OrderedSiblingList<T, K, P, I>
where
    K: Copy + PartialEq,
    P: Copy + PartialEq,
    I: SiblingIndex,
{
    /// Builds a list from records in any order.
    ///
    /// Records are sorted by their stored index; ties keep input order.
    /// Stored indices are not rewritten until the next mutation.
    pub fn new(parent: P, mut items: Vec<T>, access: SiblingAccess<T, K, P, I>) -> Self {
        items.sort_by(|a, b| (access.index)(a).order((access.index)(b)));
        Self {
            parent,
            items,
            access,
        }
    }

    /// The owning parent.
    pub fn parent(&self) -> P {
        self.parent
    }

    /// Records in position order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the list.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the parent has no children.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of a record, by key.
    pub fn position(&self, key: K) -> Option<usize> {
        self.items.iter().position(|item| (self.access.key)(item) == key)
    }

    /// Moves `moving` to `target`.
    ///
    /// If a record with the same key is already a sibling it is replaced by
    /// `moving`; otherwise `moving` is attached to this parent. `target` is
    /// clamped to `[0, len]` of the remaining siblings. Every sibling is then
    /// renumbered, and the keys whose index or parent changed are returned.
    pub fn reorder(&mut self, mut moving: T, target: i64) -> Vec<K> {
        let key = (self.access.key)(&moving);
        if let Some(position) = self.position(key) {
            self.items.remove(position);
        }

        let reparented = (self.access.parent)(&moving) != Some(self.parent);
        if reparented {
            (self.access.set_parent)(&mut moving, Some(self.parent));
        }

        let position = clamp(target, self.items.len());
        self.items.insert(position, moving);

        self.renumber_marking(reparented.then_some(key))
    }

    /// Detaches a record and closes the gap it leaves.
    ///
    /// Returns the detached record (with its parent cleared) and the keys of
    /// remaining siblings whose index changed, or `None` if `key` is not a
    /// sibling.
    pub fn remove(&mut self, key: K) -> Option<(T, Vec<K>)> {
        let position = self.position(key)?;
        let mut removed = self.items.remove(position);
        (self.access.set_parent)(&mut removed, None);
        Some((removed, self.renumber()))
    }

    /// Rewrites indices to `0..len`, returning the keys that changed.
    pub fn renumber(&mut self) -> Vec<K> {
        self.renumber_marking(None)
    }

    fn renumber_marking(&mut self, force: Option<K>) -> Vec<K> {
        let mut changed = Vec::new();
        for (position, item) in self.items.iter_mut().enumerate() {
            let index = I::from_position(position);
            let key = (self.access.key)(item);
            if !(self.access.index)(item).same(index) || force == Some(key) {
                (self.access.set_index)(item, index);
                changed.push(key);
            }
        }
        changed
    }
}

/// Reorders a standalone sibling list.
///
/// Convenience over [`OrderedSiblingList::reorder`] for callers that hold
/// a plain `Vec`.
pub fn reorder<T, K, P, I>(
    parent: P,
    siblings: Vec<T>,
    moving: T,
    target: i64,
    access: SiblingAccess<T, K, P, I>,
) -> Reordered<T, K>
where
    K: Copy + PartialEq,
    P: Copy + PartialEq,
    I: SiblingIndex,
{
    let mut list = OrderedSiblingList::new(parent, siblings, access);
    let changed = list.reorder(moving, target);
    Reordered {
        siblings: list.into_items(),
        changed,
    }
}

fn clamp(target: i64, len: usize) -> usize {
    usize::try_from(target).map_or(0, |target| target.min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: char,
        parent: Option<u8>,
        index: i32,
    }

    const ACCESS: SiblingAccess<Item, char, u8, i32> = SiblingAccess {
        key: |item| item.id,
        parent: |item| item.parent,
        set_parent: |item, parent| item.parent = parent,
        index: |item| item.index,
        set_index: |item, index| item.index = index,
    };

    fn item(id: char, parent: u8, index: i32) -> Item {
        Item {
            id,
            parent: Some(parent),
            index,
        }
    }

    fn abc() -> Vec<Item> {
        vec![item('A', 1, 0), item('B', 1, 1), item('C', 1, 2)]
    }

    fn layout(items: &[Item]) -> Vec<(char, i32)> {
        items.iter().map(|i| (i.id, i.index)).collect()
    }

    #[test]
    fn test_move_last_to_front() {
        let result = reorder(1, abc(), item('C', 1, 2), 0, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('C', 0), ('A', 1), ('B', 2)]);
        assert_eq!(result.changed, vec!['C', 'A', 'B']);
    }

    #[test]
    fn test_target_past_end_is_clamped() {
        let result = reorder(1, abc(), item('A', 1, 0), 99, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('B', 0), ('C', 1), ('A', 2)]);
    }

    #[test]
    fn test_negative_target_is_clamped_to_front() {
        let result = reorder(1, abc(), item('B', 1, 1), -5, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('B', 0), ('A', 1), ('C', 2)]);
        assert_eq!(result.changed, vec!['B', 'A']);
    }

    #[test]
    fn test_cross_attach_sets_parent() {
        let stranger = item('X', 2, 7);
        let result = reorder(1, abc(), stranger, 0, ACCESS);

        assert_eq!(
            layout(&result.siblings),
            vec![('X', 0), ('A', 1), ('B', 2), ('C', 3)]
        );
        assert_eq!(result.siblings[0].parent, Some(1));
        assert_eq!(result.changed, vec!['X', 'A', 'B', 'C']);
    }

    #[test]
    fn test_cross_attach_marks_moving_even_if_index_matches() {
        let stranger = item('X', 2, 3);
        let result = reorder(1, abc(), stranger, 3, ACCESS);

        assert_eq!(result.changed, vec!['X']);
        assert_eq!(result.siblings[3].parent, Some(1));
    }

    #[test]
    fn test_reorder_to_current_position_changes_nothing() {
        let result = reorder(1, abc(), item('B', 1, 1), 1, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('A', 0), ('B', 1), ('C', 2)]);
        assert!(result.changed.is_empty());
    }

    #[test]
    fn test_reorder_normalizes_gapped_indices() {
        let gapped = vec![item('A', 1, 4), item('B', 1, 9), item('C', 1, 20)];
        let result = reorder(1, gapped, item('B', 1, 9), 1, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('A', 0), ('B', 1), ('C', 2)]);
        assert_eq!(result.changed, vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_new_sorts_by_index() {
        let shuffled = vec![item('C', 1, 2), item('A', 1, 0), item('B', 1, 1)];
        let list = OrderedSiblingList::new(1, shuffled, ACCESS);

        assert_eq!(layout(list.items()), vec![('A', 0), ('B', 1), ('C', 2)]);
        assert_eq!(list.position('C'), Some(2));
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut list = OrderedSiblingList::new(1, abc(), ACCESS);

        let (removed, changed) = list.remove('A').unwrap();

        assert_eq!(removed.parent, None);
        assert_eq!(changed, vec!['B', 'C']);
        assert_eq!(layout(list.items()), vec![('B', 0), ('C', 1)]);
        assert!(list.remove('Z').is_none());
    }

    #[test]
    fn test_reorder_into_empty_list() {
        let result = reorder(1, Vec::new(), item('A', 2, 5), 3, ACCESS);

        assert_eq!(layout(&result.siblings), vec![('A', 0)]);
        assert_eq!(result.siblings[0].parent, Some(1));
    }

    #[test]
    fn test_float_index_positions() {
        assert_eq!(f64::from_position(0).to_bits(), 0.0f64.to_bits());
        assert_eq!(f64::from_position(12).to_bits(), 12.0f64.to_bits());
        assert!(2.0f64.same(2.0));
        assert!(!2.0f64.same(2.5));
        assert_eq!(1.5f64.order(0.5), Ordering::Greater);
    }
}
