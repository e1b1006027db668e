use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, DeleteCategoryRequestDto,
    UpdateCategoryDto,
};
use crate::features::categories::hierarchy;
use crate::features::categories::models::{Category, DeletePolicy};
use crate::features::categories::ordering::OrderUpdate;
use crate::features::categories::resolver::{plan_delete, DeletePlan};

/// Category store and write engine.
///
/// Reads return flat lists or the derived tree; every multi-row write
/// (batched reorder, cascading delete) runs in one serializable transaction
/// so partial application is never observable.
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active categories (flat, sibling order)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY display_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// List active categories as the two-level tree
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY display_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        let tree = hierarchy::build_tree(categories);
        for id in &tree.dangling {
            tracing::warn!("Dropping dangling subcategory {} from tree view", id);
        }

        Ok(tree.roots.into_iter().map(|n| n.into()).collect())
    }

    /// Get one active category by id
    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Admin flat list, inactive rows included
    pub async fn list_all(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            ORDER BY display_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Create a category, appended to its destination sibling group.
    ///
    /// The parent, when given, must be an existing main category: the tree is
    /// exactly two levels deep and a subcategory never becomes a parent.
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let mut tx = self.begin_serializable().await?;

        if let Some(parent_id) = dto.parent_id {
            let parent = Self::fetch_category(&mut tx, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Parent category {} not found", parent_id))
                })?;
            if !parent.is_main() {
                return Err(AppError::Validation(
                    "Parent must be a main category".to_string(),
                ));
            }
        }

        let display_order = Self::next_display_order(&mut tx, dto.parent_id).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (parent_id, name, description, image_url, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(dto.parent_id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.image_url)
        .bind(display_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::from_tx(e)
        })?;

        tx.commit().await.map_err(AppError::from_tx)?;

        tracing::info!(
            "Category created: id={}, parent_id={:?}, display_order={}",
            category.id,
            category.parent_id,
            category.display_order
        );

        Ok(category.into())
    }

    /// Update a category; a `parent_id` change is a structural move that
    /// appends the category to its destination sibling group.
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let mut tx = self.begin_serializable().await?;

        let current = Self::fetch_category(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let display_order = if dto.parent_id == current.parent_id {
            current.display_order
        } else {
            // Structural move: validate the destination and append there.
            if dto.parent_id == Some(id) {
                return Err(AppError::SelfReference(
                    "Category cannot be its own parent".to_string(),
                ));
            }
            if let Some(parent_id) = dto.parent_id {
                let parent = Self::fetch_category(&mut tx, parent_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Parent category {} not found", parent_id))
                    })?;
                if !parent.is_main() {
                    return Err(AppError::Validation(
                        "Parent must be a main category".to_string(),
                    ));
                }
                if !Self::fetch_children(&mut tx, id).await?.is_empty() {
                    return Err(AppError::Validation(
                        "A category with subcategories cannot become a subcategory".to_string(),
                    ));
                }
            }
            Self::next_display_order(&mut tx, dto.parent_id).await?
        };

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, description = $4, image_url = $5,
                display_order = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(dto.parent_id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.image_url)
        .bind(display_order)
        .bind(dto.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::from_tx(e)
        })?;

        tx.commit().await.map_err(AppError::from_tx)?;

        Ok(category.into())
    }

    /// Apply a batched order save atomically. An unknown id fails the whole
    /// batch; the caller re-fetches the authoritative order on any failure.
    pub async fn save_order(&self, updates: Vec<OrderUpdate>) -> Result<()> {
        let mut tx = self.begin_serializable().await?;

        for update in &updates {
            let result = sqlx::query(
                r#"
                UPDATE categories
                SET display_order = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(update.id)
            .bind(update.display_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update display order: {:?}", e);
                AppError::from_tx(e)
            })?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "Category {} not found",
                    update.id
                )));
            }
        }

        tx.commit().await.map_err(AppError::from_tx)?;

        tracing::info!("Saved display order for {} categories", updates.len());

        Ok(())
    }

    /// Delete a category, resolving its children with the requested policy.
    ///
    /// Children are reparented (or deleted) before the target row is removed,
    /// all inside one transaction, so no `parent_id` ever dangles.
    pub async fn delete_with_policy(
        &self,
        id: Uuid,
        request: DeleteCategoryRequestDto,
    ) -> Result<()> {
        let mut tx = self.begin_serializable().await?;

        let target = Self::fetch_category(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let children = Self::fetch_children(&mut tx, id).await?;

        if children.is_empty() {
            // Policy is irrelevant for a leaf.
            Self::delete_row(&mut tx, id).await?;
            tx.commit().await.map_err(AppError::from_tx)?;
            tracing::info!("Category deleted: id={}", id);
            return Ok(());
        }

        let policy = request.policy()?.ok_or_else(|| {
            AppError::Validation(
                "Category has subcategories; a delete option is required".to_string(),
            )
        })?;

        let destination = match policy {
            DeletePolicy::MoveToParent(destination_id) if destination_id != target.id => {
                Self::fetch_category(&mut tx, destination_id).await?
            }
            _ => None,
        };

        let max_order = match policy {
            DeletePolicy::DeleteAll => None,
            DeletePolicy::PromoteToMain => Self::max_display_order(&mut tx, None).await?,
            DeletePolicy::MoveToParent(destination_id) => {
                Self::max_display_order(&mut tx, Some(destination_id)).await?
            }
        };

        let plan = plan_delete(&target, &children, policy, destination.as_ref(), max_order)?;

        match &plan {
            DeletePlan::RemoveChildren { child_ids } => {
                sqlx::query("DELETE FROM categories WHERE id = ANY($1)")
                    .bind(child_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to delete subcategories: {:?}", e);
                        AppError::from_tx(e)
                    })?;
            }
            DeletePlan::Reparent { moves } => {
                for child_move in moves {
                    sqlx::query(
                        r#"
                        UPDATE categories
                        SET parent_id = $2, display_order = $3, updated_at = NOW()
                        WHERE id = $1
                        "#,
                    )
                    .bind(child_move.id)
                    .bind(child_move.new_parent_id)
                    .bind(child_move.display_order)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to reparent subcategory: {:?}", e);
                        AppError::from_tx(e)
                    })?;
                }
            }
        }

        Self::delete_row(&mut tx, id).await?;

        tx.commit().await.map_err(AppError::from_tx)?;

        tracing::info!(
            "Category deleted: id={}, children={}, plan={}",
            id,
            children.len(),
            match plan {
                DeletePlan::RemoveChildren { .. } => "deleteAll",
                DeletePlan::Reparent { ref moves } if moves.iter().any(|m| m.new_parent_id.is_some()) =>
                    "moveToParent",
                DeletePlan::Reparent { .. } => "promoteToMain",
            }
        );

        Ok(())
    }

    async fn begin_serializable(&self) -> Result<Transaction<'_, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from_tx)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_tx)?;
        Ok(tx)
    }

    async fn fetch_category(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch category: {:?}", e);
            AppError::from_tx(e)
        })
    }

    async fn fetch_children(
        tx: &mut Transaction<'_, Postgres>,
        parent_id: Uuid,
    ) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, parent_id, name, description, image_url, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE parent_id = $1
            ORDER BY display_order, id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch subcategories: {:?}", e);
            AppError::from_tx(e)
        })
    }

    /// Next append position within one sibling group (the NULL group is the
    /// set of main categories).
    async fn next_display_order(
        tx: &mut Transaction<'_, Postgres>,
        parent_id: Option<Uuid>,
    ) -> Result<i32> {
        Ok(Self::max_display_order(tx, parent_id)
            .await?
            .map_or(0, |max| max + 1))
    }

    async fn max_display_order(
        tx: &mut Transaction<'_, Postgres>,
        parent_id: Option<Uuid>,
    ) -> Result<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(display_order) FROM categories WHERE parent_id IS NOT DISTINCT FROM $1",
        )
        .bind(parent_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read max display order: {:?}", e);
            AppError::from_tx(e)
        })
    }

    async fn delete_row(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::from_tx(e)
            })?;
        Ok(())
    }
}
