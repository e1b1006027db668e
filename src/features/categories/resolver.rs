//! Cascading delete resolution.
//!
//! Deleting a category that still has subcategories needs an explicit policy
//! for what happens to them. The decision logic lives here as a pure plan
//! builder; [`CategoryService`](crate::features::categories::services::CategoryService)
//! validates the inputs against the store, builds the plan, and applies it
//! together with the target delete in one transaction, so no dangling
//! `parent_id` is ever observable.

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::hierarchy::sibling_cmp;
use crate::features::categories::models::{Category, DeletePolicy};

/// One child update applied before the target row is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildMove {
    pub id: Uuid,
    pub new_parent_id: Option<Uuid>,
    pub display_order: i32,
}

/// Resolved plan for the children of a delete target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePlan {
    /// Delete the children along with the target.
    RemoveChildren { child_ids: Vec<Uuid> },
    /// Reparent the children, then delete the target.
    Reparent { moves: Vec<ChildMove> },
}

/// Build the delete plan for a target with one or more children.
///
/// `destination` is the destination parent row for `MoveToParent` (the caller
/// looks it up in the same transaction that applies the plan) and
/// `max_order_in_destination` the current maximum `display_order` of the
/// destination sibling group — the top-level group for `PromoteToMain`.
/// Children are appended after that maximum in their current relative order.
pub fn plan_delete(
    target: &Category,
    children: &[Category],
    policy: DeletePolicy,
    destination: Option<&Category>,
    max_order_in_destination: Option<i32>,
) -> Result<DeletePlan> {
    match policy {
        DeletePolicy::DeleteAll => Ok(DeletePlan::RemoveChildren {
            child_ids: sorted_children(children).into_iter().map(|c| c.id).collect(),
        }),
        DeletePolicy::PromoteToMain => Ok(DeletePlan::Reparent {
            moves: append_moves(children, None, max_order_in_destination),
        }),
        DeletePolicy::MoveToParent(destination_id) => {
            if destination_id == target.id {
                return Err(AppError::SelfReference(
                    "Cannot move subcategories under the category being deleted".to_string(),
                ));
            }
            let destination = destination.ok_or_else(|| {
                AppError::NotFound(format!(
                    "Destination category {} not found",
                    destination_id
                ))
            })?;
            if !destination.is_main() {
                return Err(AppError::Validation(
                    "Destination must be a main category".to_string(),
                ));
            }
            Ok(DeletePlan::Reparent {
                moves: append_moves(children, Some(destination.id), max_order_in_destination),
            })
        }
    }
}

fn sorted_children(children: &[Category]) -> Vec<&Category> {
    let mut sorted: Vec<&Category> = children.iter().collect();
    sorted.sort_by(|a, b| sibling_cmp(a, b));
    sorted
}

fn append_moves(
    children: &[Category],
    new_parent_id: Option<Uuid>,
    max_order_in_destination: Option<i32>,
) -> Vec<ChildMove> {
    let first_order = max_order_in_destination.map_or(0, |max| max + 1);
    sorted_children(children)
        .into_iter()
        .zip(first_order..)
        .map(|(child, display_order)| ChildMove {
            id: child.id,
            new_parent_id,
            display_order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::hierarchy::tests::category;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_delete_all_lists_every_child() {
        let target = category(1, None, 0);
        let children = vec![category(3, Some(1), 1), category(2, Some(1), 0)];

        let plan = plan_delete(&target, &children, DeletePolicy::DeleteAll, None, None).unwrap();

        assert_eq!(
            plan,
            DeletePlan::RemoveChildren {
                child_ids: vec![id(2), id(3)],
            }
        );
    }

    #[test]
    fn test_promote_to_main_appends_after_top_level_max() {
        // A(id=1) with children B(id=2, order=0), C(id=3, order=1); one
        // pre-existing main holds order 4, so B and C land at 5 and 6.
        let target = category(1, None, 0);
        let children = vec![category(2, Some(1), 0), category(3, Some(1), 1)];

        let plan =
            plan_delete(&target, &children, DeletePolicy::PromoteToMain, None, Some(4)).unwrap();

        assert_eq!(
            plan,
            DeletePlan::Reparent {
                moves: vec![
                    ChildMove { id: id(2), new_parent_id: None, display_order: 5 },
                    ChildMove { id: id(3), new_parent_id: None, display_order: 6 },
                ],
            }
        );
    }

    #[test]
    fn test_promote_to_main_into_empty_top_level_starts_at_zero() {
        let target = category(1, None, 0);
        let children = vec![category(2, Some(1), 7)];

        let plan =
            plan_delete(&target, &children, DeletePolicy::PromoteToMain, None, None).unwrap();

        assert_eq!(
            plan,
            DeletePlan::Reparent {
                moves: vec![ChildMove { id: id(2), new_parent_id: None, display_order: 0 }],
            }
        );
    }

    #[test]
    fn test_move_to_parent_preserves_relative_order() {
        let target = category(1, None, 0);
        let destination = category(9, None, 1);
        // Equal orders: relative order falls back to id.
        let children = vec![
            category(4, Some(1), 2),
            category(3, Some(1), 2),
            category(2, Some(1), 0),
        ];

        let plan = plan_delete(
            &target,
            &children,
            DeletePolicy::MoveToParent(id(9)),
            Some(&destination),
            Some(10),
        )
        .unwrap();

        assert_eq!(
            plan,
            DeletePlan::Reparent {
                moves: vec![
                    ChildMove { id: id(2), new_parent_id: Some(id(9)), display_order: 11 },
                    ChildMove { id: id(3), new_parent_id: Some(id(9)), display_order: 12 },
                    ChildMove { id: id(4), new_parent_id: Some(id(9)), display_order: 13 },
                ],
            }
        );
    }

    #[test]
    fn test_move_to_parent_onto_target_is_self_reference() {
        let target = category(1, None, 0);
        let children = vec![category(2, Some(1), 0)];

        let err = plan_delete(
            &target,
            &children,
            DeletePolicy::MoveToParent(id(1)),
            Some(&target),
            Some(0),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::SelfReference(_)));
    }

    #[test]
    fn test_move_to_parent_missing_destination_is_not_found() {
        let target = category(1, None, 0);
        let children = vec![category(2, Some(1), 0)];

        let err =
            plan_delete(&target, &children, DeletePolicy::MoveToParent(id(9)), None, None)
                .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_move_to_parent_onto_subcategory_is_rejected() {
        let target = category(1, None, 0);
        let destination = category(9, Some(8), 0);
        let children = vec![category(2, Some(1), 0)];

        let err = plan_delete(
            &target,
            &children,
            DeletePolicy::MoveToParent(id(9)),
            Some(&destination),
            Some(0),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
