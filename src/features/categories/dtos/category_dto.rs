use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::hierarchy::TreeNode;
use crate::features::categories::models::{Category, DeletePolicy};
use crate::features::categories::ordering::OrderUpdate;

/// Response DTO for a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
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

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for a main category with its ordered subcategories.
/// Subcategories are plain categories, so the tree is exactly two levels deep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub subcategories: Vec<CategoryResponseDto>,
}

impl From<TreeNode> for CategoryTreeDto {
    fn from(node: TreeNode) -> Self {
        let c = node.category;
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            image_url: c.image_url,
            display_order: c.display_order,
            is_active: c.is_active,
            subcategories: node
                .subcategories
                .into_iter()
                .map(CategoryResponseDto::from)
                .collect(),
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    /// Reference to stored media, owned by the media collaborator
    pub image_url: Option<String>,

    /// Parent main category; omit for a top-level category
    pub parent_id: Option<Uuid>,
}

/// Request DTO for updating a category (full replace).
///
/// Changing `parentId` is a structural move; the moved category is appended
/// to its destination sibling group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub parent_id: Option<Uuid>,

    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Request DTO for the batched order save
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReorderRequestDto {
    #[validate(length(min = 1, message = "At least one order pair is required"))]
    pub categories: Vec<OrderUpdate>,
}

/// Wire form of the delete policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOptionDto {
    DeleteAll,
    PromoteToMain,
    MoveToParent,
}

/// Request DTO for deleting a category.
///
/// `option` is required only when the target still has subcategories;
/// `targetParentId` only with `moveToParent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategoryRequestDto {
    pub option: Option<DeleteOptionDto>,
    pub target_parent_id: Option<Uuid>,
}

impl DeleteCategoryRequestDto {
    /// Convert the wire form into the closed policy variant.
    pub fn policy(&self) -> Result<Option<DeletePolicy>> {
        match self.option {
            None => Ok(None),
            Some(DeleteOptionDto::DeleteAll) => Ok(Some(DeletePolicy::DeleteAll)),
            Some(DeleteOptionDto::PromoteToMain) => Ok(Some(DeletePolicy::PromoteToMain)),
            Some(DeleteOptionDto::MoveToParent) => {
                let target_parent_id = self.target_parent_id.ok_or_else(|| {
                    AppError::Validation(
                        "Select a destination category for moveToParent".to_string(),
                    )
                })?;
                Ok(Some(DeletePolicy::MoveToParent(target_parent_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_option_wire_names() {
        let dto: DeleteCategoryRequestDto =
            serde_json::from_str(r#"{"option":"promoteToMain"}"#).unwrap();
        assert_eq!(dto.option, Some(DeleteOptionDto::PromoteToMain));

        let dto: DeleteCategoryRequestDto = serde_json::from_str(
            r#"{"option":"moveToParent","targetParentId":"00000000-0000-0000-0000-000000000009"}"#,
        )
        .unwrap();
        assert_eq!(dto.option, Some(DeleteOptionDto::MoveToParent));
        assert!(dto.target_parent_id.is_some());
    }

    #[test]
    fn test_policy_requires_destination_for_move_to_parent() {
        let dto = DeleteCategoryRequestDto {
            option: Some(DeleteOptionDto::MoveToParent),
            target_parent_id: None,
        };
        assert!(matches!(dto.policy(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_policy_without_option_is_none() {
        let dto = DeleteCategoryRequestDto::default();
        assert!(dto.policy().unwrap().is_none());
    }

    #[test]
    fn test_policy_carries_destination() {
        let destination = Uuid::from_u128(9);
        let dto = DeleteCategoryRequestDto {
            option: Some(DeleteOptionDto::MoveToParent),
            target_parent_id: Some(destination),
        };
        assert_eq!(
            dto.policy().unwrap(),
            Some(DeletePolicy::MoveToParent(destination))
        );
    }
}
