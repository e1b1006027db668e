use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a taxonomy category.
///
/// `parent_id == None` marks a main (top-level) category; a non-null
/// `parent_id` marks a subcategory exactly one level below a main. The
/// service never creates deeper nesting.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// How the children of a category targeted for deletion are resolved.
///
/// The destination of `MoveToParent` lives inside the variant so it is
/// unreachable for the other two policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Delete every subcategory along with the target.
    DeleteAll,
    /// Convert every subcategory into a main category, appended after the
    /// current top-level maximum order.
    PromoteToMain,
    /// Move every subcategory under another main category, appended after
    /// that group's maximum order.
    MoveToParent(Uuid),
}
