use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::{AttachmentStore, Storage};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub attachments: AttachmentStore,
}

/// 准备服务器启动的上下文
/// 包括 TLS 提供者、存储后端（含迁移/索引）和上传目录
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，可忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    if cfg!(debug_assertions) {
        crate::storage::register::debug_storage_registry();
        debug!("Debug mode: Storage registry is enabled");
    }

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!(
        "Storage backend '{}' initialized and migrations completed",
        storage.backend_name()
    );

    let attachments = AttachmentStore::from_config(&config.upload);
    attachments.ensure_dir()?;
    warn!(
        "Attachment directory ready at {}",
        attachments.root().display()
    );

    Ok(StartupContext {
        storage,
        attachments,
    })
}
