use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::storage::Storage;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedStorageFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn Storage>>> + Send>>;
pub type StorageConstructor = Arc<dyn Fn() -> BoxedStorageFuture + Send + Sync>;

pub const SEA_ORM_BACKEND: &str = "sea_orm";
pub const MONGODB_BACKEND: &str = "mongodb";

static STORAGE_REGISTRY: Lazy<RwLock<HashMap<String, StorageConstructor>>> = Lazy::new(|| {
    let mut registry: HashMap<String, StorageConstructor> = HashMap::new();
    registry.insert(
        SEA_ORM_BACKEND.to_string(),
        Arc::new(|| {
            Box::pin(async {
                let storage = super::sea_orm_storage::SeaOrmStorage::new_async().await?;
                Ok(Arc::new(storage) as Arc<dyn Storage>)
            })
        }),
    );
    registry.insert(
        MONGODB_BACKEND.to_string(),
        Arc::new(|| {
            Box::pin(async {
                let storage = super::mongo_storage::MongoStorage::new_async().await?;
                Ok(Arc::new(storage) as Arc<dyn Storage>)
            })
        }),
    );
    RwLock::new(registry)
});

pub fn register_storage_plugin<S: Into<String>>(name: S, constructor: StorageConstructor) {
    let name = name.into();
    let mut registry = STORAGE_REGISTRY
        .write()
        .expect("Storage registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_storage_plugin(name: &str) -> Option<StorageConstructor> {
    STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_storage_registry() {
    let registry = STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned");
    tracing::debug!("Registered storage backends:");
    for key in registry.keys() {
        tracing::debug!(" - {}", key);
    }
}

/// 解析存储后端名称
///
/// 显式配置优先；否则根据 URL 推断，mongodb:// 与 mongodb+srv:// 使用 MongoDB，其余使用 SeaORM。
pub fn resolve_backend_name(database: &DatabaseConfig) -> String {
    let backend = database.backend.trim();
    if !backend.is_empty() {
        return backend.to_lowercase();
    }
    if database.url.starts_with("mongodb://") || database.url.starts_with("mongodb+srv://") {
        MONGODB_BACKEND.to_string()
    } else {
        SEA_ORM_BACKEND.to_string()
    }
}
