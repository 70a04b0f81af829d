//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::{Post, PostId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored posts could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("server responded with status {status}: {body}")]
    Server { status: u16, body: String },
}

impl RepoError {
    pub fn server(status: u16, body: impl Into<String>) -> Self {
        Self::Server {
            status,
            body: body.into(),
        }
    }
}

/// Read side: the initial load of the full post list.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn load_posts(&self) -> Result<Vec<Post>, RepoError>;
}

/// Write side. Each call receives the mutated post (or id) together with the
/// full list as it stands after the local change.
#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    /// Returns the stored representation of `post`.
    async fn create_post(&self, post: &Post, snapshot: &[Post]) -> Result<Post, RepoError>;

    /// Returns the stored representation of `post`.
    async fn update_post(&self, post: &Post, snapshot: &[Post]) -> Result<Post, RepoError>;

    async fn delete_post(&self, id: PostId, snapshot: &[Post]) -> Result<(), RepoError>;
}
