//! Orchestration over the item repository.
//!
//! No business rules beyond what the repository enforces; this layer exists to
//! log operation outcomes in one place and to keep handlers free of
//! persistence types.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Item, ItemPatch, NewItem};
use crate::pagination::Pagination;
use crate::repository::ItemRepository;

/// Result of a create: the generated id paired with the submitted fields.
/// The item is echoed back, not re-fetched.
#[derive(Debug, Clone)]
pub struct CreatedItem {
    pub id: i32,
    pub item: NewItem,
}

/// Result of an update or delete.
#[derive(Debug, Clone, Copy)]
pub struct AffectedItem {
    pub id: i32,
    pub affected_rows: u64,
}

#[derive(Clone)]
pub struct ItemService {
    repository: Arc<dyn ItemRepository>,
}

impl ItemService {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_item(&self, item: NewItem) -> Result<CreatedItem, AppError> {
        let id = self.repository.create(&item).await?;
        tracing::info!(item_id = id, "item created");
        Ok(CreatedItem { id, item })
    }

    pub async fn get_all_items(&self) -> Result<Vec<Item>, AppError> {
        self.repository.find_all().await
    }

    pub async fn get_all_items_paginated(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<Item>, i64), AppError> {
        self.repository.find_all_paginated(pagination).await
    }

    pub async fn get_item_by_id(&self, id: i32) -> Result<Item, AppError> {
        self.repository.find_by_id(id).await
    }

    pub async fn update_item(&self, id: i32, patch: &ItemPatch) -> Result<AffectedItem, AppError> {
        let affected_rows = self.repository.update(id, patch).await?;
        tracing::info!(item_id = id, affected_rows, "item updated");
        Ok(AffectedItem { id, affected_rows })
    }

    pub async fn delete_item(&self, id: i32) -> Result<AffectedItem, AppError> {
        let affected_rows = self.repository.delete(id).await?;
        tracing::info!(item_id = id, affected_rows, "item deleted");
        Ok(AffectedItem { id, affected_rows })
    }
}
