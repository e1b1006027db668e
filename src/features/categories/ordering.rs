//! Sibling reorder engine.
//!
//! Reordering is edited locally and committed as one batch: the admin surface
//! builds a [`SiblingOrder`] from one sibling group, applies any number of
//! `move_up` / `move_down` calls, and submits the resulting updates through a
//! single `save_order` call. Nothing is persisted per click, and the pending
//! state is discarded wholesale if the batched save fails.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One `{id, displayOrder}` pair of a batched order update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: Uuid,
    pub display_order: i32,
}

/// Pending reorder state for exactly one sibling group.
///
/// Entries are kept in visible order. Moves swap `display_order` values with
/// the adjacent entry rather than renumbering the group, so siblings that were
/// not touched keep their stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingOrder {
    entries: Vec<OrderUpdate>,
}

impl SiblingOrder {
    /// Build from a sibling group, sorting exactly as the hierarchy builder
    /// does: ascending `display_order`, ties broken by `id`.
    pub fn from_group<I>(group: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, i32)>,
    {
        let mut entries: Vec<OrderUpdate> = group
            .into_iter()
            .map(|(id, display_order)| OrderUpdate { id, display_order })
            .collect();
        entries.sort_by_key(|e| (e.display_order, e.id));
        Self { entries }
    }

    /// Move the node one position towards the front of the group.
    /// Returns `false` for a no-op (already first, or unknown id).
    pub fn move_up(&mut self, id: Uuid) -> bool {
        match self.position(id) {
            Some(i) if i > 0 => {
                self.swap(i - 1, i);
                true
            }
            _ => false,
        }
    }

    /// Move the node one position towards the back of the group.
    /// Returns `false` for a no-op (already last, or unknown id).
    pub fn move_down(&mut self, id: Uuid) -> bool {
        match self.position(id) {
            Some(i) if i + 1 < self.entries.len() => {
                self.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Ids in their current visible order.
    pub fn ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// The complete batch submitted to the store on save.
    pub fn into_updates(self) -> Vec<OrderUpdate> {
        self.entries
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn swap(&mut self, a: usize, b: usize) {
        let order_a = self.entries[a].display_order;
        let order_b = self.entries[b].display_order;
        self.entries[a].display_order = order_b;
        self.entries[b].display_order = order_a;
        self.entries.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn group_xyz() -> SiblingOrder {
        // X(order=0), Y(order=1), Z(order=2)
        SiblingOrder::from_group(vec![(id(1), 0), (id(2), 1), (id(3), 2)])
    }

    #[test]
    fn test_move_down_then_move_up() {
        // moveDown(X): Y,X,Z then moveUp(Z): Y,Z,X
        let mut order = group_xyz();
        assert!(order.move_down(id(1)));
        assert!(order.move_up(id(3)));

        assert_eq!(order.ids(), vec![id(2), id(3), id(1)]);
        assert_eq!(
            order.into_updates(),
            vec![
                OrderUpdate { id: id(2), display_order: 0 },
                OrderUpdate { id: id(3), display_order: 1 },
                OrderUpdate { id: id(1), display_order: 2 },
            ]
        );
    }

    #[test]
    fn test_boundary_moves_are_noops() {
        let mut order = group_xyz();
        let before = order.clone();

        assert!(!order.move_up(id(1)));
        assert!(!order.move_down(id(3)));
        assert_eq!(order, before);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut order = group_xyz();
        let before = order.clone();

        assert!(!order.move_up(id(42)));
        assert!(!order.move_down(id(42)));
        assert_eq!(order, before);
    }

    #[test]
    fn test_swap_leaves_untouched_siblings_alone() {
        // Non-contiguous stored orders survive a swap of the first two nodes.
        let mut order = SiblingOrder::from_group(vec![(id(1), 10), (id(2), 20), (id(3), 70)]);
        assert!(order.move_down(id(1)));

        assert_eq!(
            order.into_updates(),
            vec![
                OrderUpdate { id: id(2), display_order: 10 },
                OrderUpdate { id: id(1), display_order: 20 },
                OrderUpdate { id: id(3), display_order: 70 },
            ]
        );
    }

    #[test]
    fn test_initial_sort_breaks_ties_by_id() {
        let order = SiblingOrder::from_group(vec![(id(3), 0), (id(1), 0), (id(2), 0)]);
        assert_eq!(order.ids(), vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn test_move_sequence_matches_persisted_order() {
        // Re-sorting the submitted batch the way the hierarchy builder sorts
        // a sibling group reproduces the visible order (order-preservation).
        let mut order = group_xyz();
        order.move_down(id(1));
        order.move_down(id(1));
        order.move_up(id(2));

        let visible = order.ids();
        let mut persisted = order.into_updates();
        persisted.sort_by_key(|e| (e.display_order, e.id));
        let rebuilt: Vec<Uuid> = persisted.into_iter().map(|e| e.id).collect();

        assert_eq!(rebuilt, visible);
    }
}
