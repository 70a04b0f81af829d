//! REST-backed post repository: one HTTP request per mutation.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
use crate::domain::posts::{Post, PostId};

pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:3500";

const POSTS_PATH: &str = "posts";

#[derive(Debug, Clone)]
pub struct RemotePostsRepository {
    client: Client,
    base: Url,
}

impl RemotePostsRepository {
    pub fn new(base_url: &str) -> Result<Self, RepoError> {
        let base = normalize_base(Url::parse(base_url)?);
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("blogdeck/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn collection_url(&self) -> Result<Url, RepoError> {
        Ok(self.base.join(POSTS_PATH)?)
    }

    fn item_url(&self, id: PostId) -> Result<Url, RepoError> {
        Ok(self.base.join(&format!("{POSTS_PATH}/{id}"))?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Post>,
    ) -> Result<T, RepoError> {
        debug!(%method, %url, "remote request");
        let mut request = self.client.request(method, url);
        if let Some(post) = body {
            request = request.json(post);
        }
        let response = request.send().await?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, RepoError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return Err(RepoError::server(status.as_u16(), text));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Relative joins only extend the base when its path ends with `/`.
fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[async_trait]
impl PostsRepo for RemotePostsRepository {
    #[instrument(skip(self))]
    async fn load_posts(&self) -> Result<Vec<Post>, RepoError> {
        let url = self.collection_url()?;
        self.send(Method::GET, url, None).await
    }
}

#[async_trait]
impl PostsWriteRepo for RemotePostsRepository {
    #[instrument(skip(self, post, _snapshot), fields(id = %post.id))]
    async fn create_post(&self, post: &Post, _snapshot: &[Post]) -> Result<Post, RepoError> {
        let url = self.collection_url()?;
        self.send(Method::POST, url, Some(post)).await
    }

    #[instrument(skip(self, post, _snapshot), fields(id = %post.id))]
    async fn update_post(&self, post: &Post, _snapshot: &[Post]) -> Result<Post, RepoError> {
        let url = self.item_url(post.id)?;
        self.send(Method::PUT, url, Some(post)).await
    }

    #[instrument(skip(self, _snapshot))]
    async fn delete_post(&self, id: PostId, _snapshot: &[Post]) -> Result<(), RepoError> {
        let url = self.item_url(id)?;
        debug!(%url, "remote request");
        let response = self.client.request(Method::DELETE, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(RepoError::server(status.as_u16(), text));
        }
        Ok(())
    }
}
