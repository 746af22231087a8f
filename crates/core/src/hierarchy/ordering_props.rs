//! Property-based tests for sibling ordering.

use proptest::prelude::*;

use super::ordering::{SiblingAccess, SiblingIndex, reorder};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u32,
    parent: Option<u32>,
    index: f64,
}

const ROWS: SiblingAccess<Row, u32, u32, f64> = SiblingAccess {
    key: |row| row.id,
    parent: |row| row.parent,
    set_parent: |row, parent| row.parent = parent,
    index: |row| row.index,
    set_index: |row, index| row.index = index,
};

const PARENT: u32 = 1;

/// A contiguous sibling list of `len` rows under `PARENT`.
fn siblings(len: usize) -> Vec<Row> {
    (0..len)
        .map(|position| Row {
            id: u32::try_from(position).unwrap(),
            parent: Some(PARENT),
            index: f64::from_position(position),
        })
        .collect()
}

fn ids(rows: &[Row]) -> Vec<u32> {
    rows.iter().map(|row| row.id).collect()
}

fn assert_contiguous(rows: &[Row]) -> Result<(), TestCaseError> {
    for (position, row) in rows.iter().enumerate() {
        prop_assert!(
            row.index.same(f64::from_position(position)),
            "row {} at position {} has index {}",
            row.id,
            position,
            row.index
        );
        prop_assert_eq!(row.parent, Some(PARENT));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// After any reorder, indices are exactly 0..len.
    #[test]
    fn prop_indices_contiguous(len in 1usize..30, pick in any::<prop::sample::Index>(), target in -50i64..50) {
        let rows = siblings(len);
        let moving = rows[pick.index(len)].clone();

        let result = reorder(PARENT, rows, moving, target, ROWS);

        prop_assert_eq!(result.siblings.len(), len);
        assert_contiguous(&result.siblings)?;
    }

    /// The moving row lands at the clamped target.
    #[test]
    fn prop_target_clamped(len in 1usize..30, pick in any::<prop::sample::Index>(), target in -50i64..50) {
        let rows = siblings(len);
        let moving = rows[pick.index(len)].clone();
        let moving_id = moving.id;

        let result = reorder(PARENT, rows, moving, target, ROWS);

        let expected = usize::try_from(target.max(0)).unwrap().min(len - 1);
        prop_assert_eq!(result.siblings[expected].id, moving_id);
    }

    /// Every other row keeps its relative order.
    #[test]
    fn prop_relative_order_preserved(len in 1usize..30, pick in any::<prop::sample::Index>(), target in -50i64..50) {
        let rows = siblings(len);
        let moving = rows[pick.index(len)].clone();
        let moving_id = moving.id;
        let before: Vec<u32> = ids(&rows).into_iter().filter(|id| *id != moving_id).collect();

        let result = reorder(PARENT, rows, moving, target, ROWS);

        let after: Vec<u32> = ids(&result.siblings).into_iter().filter(|id| *id != moving_id).collect();
        prop_assert_eq!(before, after);
    }

    /// A row from another parent is attached and positioned in one step.
    #[test]
    fn prop_cross_attach(len in 0usize..30, target in -50i64..50) {
        let rows = siblings(len);
        let stranger = Row { id: 10_000, parent: Some(2), index: 0.0 };

        let result = reorder(PARENT, rows, stranger, target, ROWS);

        prop_assert_eq!(result.siblings.len(), len + 1);
        assert_contiguous(&result.siblings)?;
        prop_assert!(result.changed.contains(&10_000));
    }

    /// `changed` is exactly the set of rows whose index or parent moved.
    #[test]
    fn prop_changed_is_exact(len in 1usize..30, pick in any::<prop::sample::Index>(), target in -50i64..50) {
        let rows = siblings(len);
        let moving = rows[pick.index(len)].clone();

        let result = reorder(PARENT, rows.clone(), moving, target, ROWS);

        for row in &result.siblings {
            let prior = rows.iter().find(|r| r.id == row.id).unwrap();
            let moved = !prior.index.same(row.index) || prior.parent != row.parent;
            prop_assert_eq!(result.changed.contains(&row.id), moved);
        }
    }

    /// Reordering twice to the same place writes nothing the second time.
    #[test]
    fn prop_repeat_is_stable(len in 1usize..30, pick in any::<prop::sample::Index>(), target in -50i64..50) {
        let rows = siblings(len);
        let moving = rows[pick.index(len)].clone();
        let first = reorder(PARENT, rows, moving.clone(), target, ROWS);

        let moved = first.siblings.iter().find(|r| r.id == moving.id).unwrap().clone();
        let second = reorder(PARENT, first.siblings.clone(), moved, target, ROWS);

        prop_assert_eq!(ids(&second.siblings), ids(&first.siblings));
        prop_assert!(second.changed.is_empty());
    }
}
