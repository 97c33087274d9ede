//! Test fixtures: an in-memory `ItemRepository` and router construction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use tokio::sync::RwLock;

use items_api::error::AppError;
use items_api::handlers::AppState;
use items_api::key_generator::KeyGenerator;
use items_api::models::{Item, ItemPatch, NewItem};
use items_api::pagination::Pagination;
use items_api::rate_limiter::{MemoryCounterStore, RateLimiter};
use items_api::repository::ItemRepository;
use items_api::server::create_app;
use items_api::service::ItemService;

/// In-memory repository with the same contract as the Postgres one:
/// newest-first ordering, NotFound for missing ids, affected-row counts.
#[derive(Default)]
pub struct InMemoryItemRepository {
    state: RwLock<RepositoryState>,
}

#[derive(Default)]
struct RepositoryState {
    items: Vec<Item>,
    next_id: i32,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("No se encontró ningún item con ID: {}", id))
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, item: &NewItem) -> Result<i32, AppError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        // newest entries go first so pagination matches created_at DESC
        state.items.insert(
            0,
            Item {
                id,
                nombre: item.nombre.clone(),
                descripcion: item.descripcion.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        let state = self.state.read().await;
        Ok(state.items.clone())
    }

    async fn find_all_paginated(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<Item>, i64), AppError> {
        let state = self.state.read().await;
        let total = state.items.len() as i64;
        let items = state
            .items
            .iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Item, AppError> {
        let state = self.state.read().await;
        state
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: i32, patch: &ItemPatch) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| not_found(id))?;

        if let Some(nombre) = &patch.nombre {
            item.nombre = nombre.clone();
        }
        if let Some(descripcion) = &patch.descripcion {
            item.descripcion = Some(descripcion.clone());
        }
        item.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        if state.items.len() == before {
            return Err(not_found(id));
        }
        Ok(1)
    }
}

pub struct TestApp {
    pub router: Router,
}

/// Router backed by the in-memory repository and the in-process counter
/// store, with the given quota on every limiter.
pub fn test_app(rate_limit_max: u32) -> TestApp {
    let repository = Arc::new(InMemoryItemRepository::new());
    let service = ItemService::new(repository);

    let store = Arc::new(MemoryCounterStore::new());
    let window = Duration::from_secs(60);

    let state = AppState {
        service,
        read_limiter: Arc::new(RateLimiter::new(window, rate_limit_max, store.clone())),
        write_limiter: Arc::new(RateLimiter::new(window, rate_limit_max, store)),
        keys: Arc::new(KeyGenerator::default()),
        rate_limit_backend: "memory",
    };

    TestApp {
        router: create_app(state),
    }
}

/// App with quotas high enough that rate limiting never interferes.
pub fn unlimited_app() -> TestApp {
    test_app(10_000)
}
