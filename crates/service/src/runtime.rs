//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the data and image directories exist before the stores open them.
pub async fn ensure_env(data_dir: &str, images_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(data_dir, images_dir).await
}
