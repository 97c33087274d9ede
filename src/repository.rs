//! Item persistence against Postgres.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Item, ItemPatch, NewItem};
use crate::pagination::Pagination;

/// CRUD operations over the `items` table. Implementations raise
/// `AppError::NotFound` for missing rows and wrap every other persistence
/// failure as `AppError::Database`; raw driver errors never escape.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Inserts an item and returns its generated id.
    async fn create(&self, item: &NewItem) -> Result<i32, AppError>;

    /// Every item, newest first.
    async fn find_all(&self) -> Result<Vec<Item>, AppError>;

    /// One page of items, newest first, plus the total row count.
    async fn find_all_paginated(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<Item>, i64), AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Item, AppError>;

    /// Applies a partial update, refreshing `updated_at`. Verifies existence
    /// first so a missing row is a 404, not a zero-row update.
    async fn update(&self, id: i32, patch: &ItemPatch) -> Result<u64, AppError>;

    /// Deletes an item, verifying existence first.
    async fn delete(&self, id: i32) -> Result<u64, AppError>;
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("No se encontró ningún item con ID: {}", id))
}

/// Postgres implementation. Queries run against the pool directly, so each
/// statement checks out a connection for its own scope and releases it on
/// every exit path.
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, item: &NewItem) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO items (nombre, descripcion) VALUES ($1, $2) RETURNING id",
        )
        .bind(&item.nombre)
        .bind(&item.descripcion)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to insert item");
            AppError::Database("Error al crear item en la base de datos".into())
        })
    }

    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        sqlx::query_as::<_, Item>(
            "SELECT id, nombre, descripcion, created_at, updated_at \
             FROM items ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to list items");
            AppError::Database("Error al consultar items en la base de datos".into())
        })
    }

    async fn find_all_paginated(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<Item>, i64), AppError> {
        let wrap = |err: sqlx::Error| {
            tracing::error!(error = %err, "failed to list items page");
            AppError::Database("Error al obtener items paginados de la base de datos".into())
        };

        let items = sqlx::query_as::<_, Item>(
            "SELECT id, nombre, descripcion, created_at, updated_at \
             FROM items ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(wrap)?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(wrap)?;

        Ok((items, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            "SELECT id, nombre, descripcion, created_at, updated_at \
             FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!(item_id = id, error = %err, "failed to fetch item");
            AppError::Database("Error al consultar item en la base de datos".into())
        })?
        .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: i32, patch: &ItemPatch) -> Result<u64, AppError> {
        // existence check first: missing row is NotFound, not affected = 0
        self.find_by_id(id).await?;

        let result = sqlx::query(
            "UPDATE items SET \
                 nombre = COALESCE($2, nombre), \
                 descripcion = COALESCE($3, descripcion), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.nombre)
        .bind(&patch.descripcion)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!(item_id = id, error = %err, "failed to update item");
            AppError::Database("Error al actualizar item en la base de datos".into())
        })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        self.find_by_id(id).await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!(item_id = id, error = %err, "failed to delete item");
                AppError::Database("Error al eliminar item en la base de datos".into())
            })?;

        Ok(result.rows_affected())
    }
}
