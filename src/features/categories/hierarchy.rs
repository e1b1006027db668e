//! Read-side tree view over the flat category table.
//!
//! The store stays flat; every render re-derives the two-level tree from the
//! full row set. Building is pure and deterministic: mains sorted by
//! `(display_order, id)`, each main's subcategories sorted the same way.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::features::categories::models::Category;

/// One main category with its ordered subcategories.
///
/// Subcategories are plain rows, so a built tree structurally cannot nest
/// deeper than one level.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// Result of a tree build: ordered roots plus any subcategory whose parent
/// row was missing from the input set.
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub roots: Vec<TreeNode>,
    pub dangling: Vec<Uuid>,
}

/// Build the two-level tree from the full flat category set.
///
/// A subcategory whose `parent_id` does not match any main in the input is
/// dropped from the tree and reported in `dangling` — never promoted to a
/// main. The referential integrity of the store should make this unreachable,
/// but the view must not trust that.
pub fn build_tree(categories: Vec<Category>) -> TreeBuild {
    let (mut mains, subs): (Vec<Category>, Vec<Category>) =
        categories.into_iter().partition(|c| c.parent_id.is_none());

    mains.sort_by(sibling_cmp);

    let main_ids: HashSet<Uuid> = mains.iter().map(|c| c.id).collect();

    let mut by_parent: HashMap<Uuid, Vec<Category>> = HashMap::new();
    let mut dangling = Vec::new();
    for sub in subs {
        let Some(parent_id) = sub.parent_id else {
            continue;
        };
        if main_ids.contains(&parent_id) {
            by_parent.entry(parent_id).or_default().push(sub);
        } else {
            dangling.push(sub.id);
        }
    }

    let roots = mains
        .into_iter()
        .map(|main| {
            let mut subcategories = by_parent.remove(&main.id).unwrap_or_default();
            subcategories.sort_by(sibling_cmp);
            TreeNode {
                category: main,
                subcategories,
            }
        })
        .collect();

    TreeBuild { roots, dangling }
}

/// Sibling sort: ascending `display_order`, ties broken by `id` so the order
/// is total even when orders collide.
pub fn sibling_cmp(a: &Category, b: &Category) -> std::cmp::Ordering {
    (a.display_order, a.id).cmp(&(b.display_order, b.id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn category(id: u128, parent: Option<u128>, order: i32) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::from_u128(id),
            parent_id: parent.map(Uuid::from_u128),
            name: format!("category-{}", id),
            description: None,
            image_url: None,
            display_order: order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_builds_two_level_tree_in_display_order() {
        let tree = build_tree(vec![
            category(2, None, 1),
            category(1, None, 0),
            category(11, Some(1), 1),
            category(10, Some(1), 0),
            category(20, Some(2), 0),
        ]);

        assert!(tree.dangling.is_empty());
        let root_ids: Vec<Uuid> = tree.roots.iter().map(|n| n.category.id).collect();
        assert_eq!(root_ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);

        let sub_ids: Vec<Uuid> = tree.roots[0].subcategories.iter().map(|c| c.id).collect();
        assert_eq!(sub_ids, vec![Uuid::from_u128(10), Uuid::from_u128(11)]);
        assert_eq!(tree.roots[1].subcategories.len(), 1);
    }

    #[test]
    fn test_order_ties_broken_by_id() {
        let tree = build_tree(vec![
            category(5, None, 0),
            category(3, None, 0),
            category(4, None, 0),
        ]);

        let root_ids: Vec<Uuid> = tree.roots.iter().map(|n| n.category.id).collect();
        assert_eq!(
            root_ids,
            vec![Uuid::from_u128(3), Uuid::from_u128(4), Uuid::from_u128(5)]
        );
    }

    #[test]
    fn test_dangling_subcategory_dropped_not_promoted() {
        let tree = build_tree(vec![
            category(1, None, 0),
            // parent 99 does not exist
            category(10, Some(99), 0),
        ]);

        assert_eq!(tree.roots.len(), 1);
        assert!(tree.roots[0].subcategories.is_empty());
        assert_eq!(tree.dangling, vec![Uuid::from_u128(10)]);
    }

    #[test]
    fn test_subcategory_of_subcategory_reported_dangling() {
        // A row parented onto a subcategory violates the depth bound; the
        // builder must not render it as a grandchild.
        let tree = build_tree(vec![
            category(1, None, 0),
            category(10, Some(1), 0),
            category(100, Some(10), 0),
        ]);

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].subcategories.len(), 1);
        assert_eq!(tree.dangling, vec![Uuid::from_u128(100)]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let rows = vec![
            category(2, None, 5),
            category(1, None, 5),
            category(10, Some(1), 3),
            category(11, Some(1), 3),
        ];

        let a = build_tree(rows.clone());
        let b = build_tree(rows);

        let ids = |t: &TreeBuild| -> Vec<Uuid> { t.roots.iter().map(|n| n.category.id).collect() };
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(
            a.roots[0].subcategories.iter().map(|c| c.id).collect::<Vec<_>>(),
            b.roots[0].subcategories.iter().map(|c| c.id).collect::<Vec<_>>(),
        );
    }
}
