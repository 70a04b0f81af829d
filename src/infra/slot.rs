//! Durable local slot: a directory of JSON files addressed by key.
//!
//! Every write overwrites the whole slot with the current post list. There is
//! no versioning and no retry; the last write wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use crate::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
use crate::domain::posts::{Post, PostId};

pub const DEFAULT_SLOT_KEY: &str = "posts";

#[derive(Debug, Clone)]
pub struct LocalSlotRepository {
    directory: PathBuf,
    key: String,
}

impl LocalSlotRepository {
    pub fn new(directory: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot_path(&self) -> PathBuf {
        self.directory.join(format!("{}.json", self.key))
    }

    /// Raw slot contents, or `None` when nothing has been written yet.
    pub async fn read_raw(&self) -> Result<Option<String>, RepoError> {
        match fs::read_to_string(self.slot_path()).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepoError::Io(err)),
        }
    }

    #[instrument(skip(self, posts), fields(key = %self.key, count = posts.len()))]
    pub async fn write_all(&self, posts: &[Post]) -> Result<(), RepoError> {
        let encoded = serde_json::to_string(posts)?;
        ensure_directory(&self.directory).await?;
        fs::write(self.slot_path(), encoded).await?;
        debug!("slot written");
        Ok(())
    }
}

async fn ensure_directory(directory: &Path) -> Result<(), RepoError> {
    if directory.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(directory).await?;
    Ok(())
}

/// Blank or `null` slots decode to an empty list.
pub fn decode_slot(contents: &str) -> Result<Vec<Post>, RepoError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let decoded: Option<Vec<Post>> = serde_json::from_str(contents)?;
    Ok(decoded.unwrap_or_default())
}

#[async_trait]
impl PostsRepo for LocalSlotRepository {
    async fn load_posts(&self) -> Result<Vec<Post>, RepoError> {
        match self.read_raw().await? {
            Some(contents) => decode_slot(&contents),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl PostsWriteRepo for LocalSlotRepository {
    async fn create_post(&self, post: &Post, snapshot: &[Post]) -> Result<Post, RepoError> {
        self.write_all(snapshot).await?;
        Ok(post.clone())
    }

    async fn update_post(&self, post: &Post, snapshot: &[Post]) -> Result<Post, RepoError> {
        self.write_all(snapshot).await?;
        Ok(post.clone())
    }

    async fn delete_post(&self, _id: PostId, snapshot: &[Post]) -> Result<(), RepoError> {
        self.write_all(snapshot).await
    }
}
