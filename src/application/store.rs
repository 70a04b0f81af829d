//! The post store: canonical post list, search term, derived results, and
//! the new/edit form buffers.
//!
//! All mutation goes through `submit_new_post`, `submit_edit` and
//! `delete_post`. Each one updates the list optimistically, re-derives the
//! search results, hands the change to the configured writer, and finally
//! navigates home. Writer failures are logged and counted; local state is
//! never rolled back.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::domain::posts::{
    Post, PostId, current_post_datetime, find_by_route_param, next_post_id,
};
use crate::domain::search::derive_search_results;

use super::fetch::{FetchHook, FetchPhase};
use super::metrics::{METRIC_PERSIST_FAILURES, METRIC_STORE_MUTATIONS};
use super::navigation::{Navigator, Route};
use super::repos::{PostsRepo, PostsWriteRepo, RepoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBuffer {
    pub title: String,
    pub body: String,
}

impl FormBuffer {
    fn take(&mut self) -> (String, String) {
        (
            std::mem::take(&mut self.title),
            std::mem::take(&mut self.body),
        )
    }

    fn clear(&mut self) {
        self.title.clear();
        self.body.clear();
    }
}

pub struct PostStore {
    posts: Vec<Post>,
    search: String,
    search_results: Vec<Post>,
    new_post: FormBuffer,
    edit: FormBuffer,
    fetch: FetchHook,
    writer: Arc<dyn PostsWriteRepo>,
    navigator: Arc<dyn Navigator>,
}

impl PostStore {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            posts: Vec::new(),
            search: String::new(),
            search_results: Vec::new(),
            new_post: FormBuffer::default(),
            edit: FormBuffer::default(),
            fetch: FetchHook::new(reader),
            writer,
            navigator,
        }
    }

    /// Runs the initial load once and adopts its result as the post list.
    pub async fn mount(&mut self) {
        let state = self.fetch.fetch().await;
        match state.phase {
            FetchPhase::Loaded => {
                self.posts = state.data.clone();
                info!(count = self.posts.len(), "posts loaded");
            }
            FetchPhase::Failed => self.posts.clear(),
            FetchPhase::Idle | FetchPhase::Loading => {}
        }
        self.refresh_search_results();
    }

    /// Drops interest in any load still in flight.
    pub fn unmount(&mut self) {
        self.fetch.teardown();
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn search_results(&self) -> &[Post] {
        &self.search_results
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch.state().fetch_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.state().is_loading()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.refresh_search_results();
    }

    pub fn post_title(&self) -> &str {
        &self.new_post.title
    }

    pub fn post_body(&self) -> &str {
        &self.new_post.body
    }

    pub fn set_post_title(&mut self, title: impl Into<String>) {
        self.new_post.title = title.into();
    }

    pub fn set_post_body(&mut self, body: impl Into<String>) {
        self.new_post.body = body.into();
    }

    pub fn edit_title(&self) -> &str {
        &self.edit.title
    }

    pub fn edit_body(&self) -> &str {
        &self.edit.body
    }

    pub fn set_edit_title(&mut self, title: impl Into<String>) {
        self.edit.title = title.into();
    }

    pub fn set_edit_body(&mut self, body: impl Into<String>) {
        self.edit.body = body.into();
    }

    pub fn find_post(&self, route_id: &str) -> Option<&Post> {
        find_by_route_param(&self.posts, route_id)
    }

    /// Prefills the edit buffer from the post named by `route_id`.
    pub fn begin_edit(&mut self, route_id: &str) -> Option<&Post> {
        let index = self
            .posts
            .iter()
            .position(|post| post.id.matches_route_param(route_id))?;
        let post = &self.posts[index];
        self.edit.title.clone_from(&post.title);
        self.edit.body.clone_from(&post.body);
        Some(post)
    }

    pub async fn submit_new_post(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> MutationOutcome {
        let Some(id) = next_post_id(&self.posts) else {
            warn!(count = self.posts.len(), "no post id left to assign; create ignored");
            return MutationOutcome::Unchanged;
        };
        let post = Post::new(id, title, body, current_post_datetime());
        debug!(id = %post.id, "creating post");

        self.posts.push(post.clone());
        self.refresh_search_results();
        counter!(METRIC_STORE_MUTATIONS, "op" => "create").increment(1);

        let result = self.writer.create_post(&post, &self.posts).await;
        self.reconcile(post.id, result, "create");

        self.new_post.clear();
        self.navigator.navigate(Route::Home);
        MutationOutcome::Applied
    }

    /// Submits the new-post form buffer.
    pub async fn submit_new_post_form(&mut self) -> MutationOutcome {
        let (title, body) = self.new_post.take();
        self.submit_new_post(title, body).await
    }

    pub async fn submit_edit(
        &mut self,
        id: PostId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> MutationOutcome {
        let outcome = match self.posts.iter().position(|post| post.id == id) {
            Some(index) => {
                let existing = &mut self.posts[index];
                existing.title = title.into();
                existing.body = body.into();
                existing.datetime = current_post_datetime();
                let updated = existing.clone();
                debug!(id = %id, "editing post");

                self.refresh_search_results();
                counter!(METRIC_STORE_MUTATIONS, "op" => "update").increment(1);

                let result = self.writer.update_post(&updated, &self.posts).await;
                self.reconcile(id, result, "update");
                MutationOutcome::Applied
            }
            None => {
                debug!(id = %id, "edit ignored, post not found");
                MutationOutcome::Unchanged
            }
        };

        self.edit.clear();
        self.navigator.navigate(Route::Home);
        outcome
    }

    /// Submits the edit form buffer against `id`.
    pub async fn submit_edit_form(&mut self, id: PostId) -> MutationOutcome {
        let (title, body) = self.edit.take();
        self.submit_edit(id, title, body).await
    }

    pub async fn delete_post(&mut self, id: PostId) -> MutationOutcome {
        let before = self.posts.len();
        self.posts.retain(|post| post.id != id);

        let outcome = if self.posts.len() == before {
            debug!(id = %id, "delete ignored, post not found");
            MutationOutcome::Unchanged
        } else {
            debug!(id = %id, "deleting post");
            self.refresh_search_results();
            counter!(METRIC_STORE_MUTATIONS, "op" => "delete").increment(1);

            if let Err(err) = self.writer.delete_post(id, &self.posts).await {
                record_write_failure("delete", id, &err);
            }
            MutationOutcome::Applied
        };

        self.navigator.navigate(Route::Home);
        outcome
    }

    /// Folds the writer's stored representation back into the list.
    fn reconcile(&mut self, id: PostId, result: Result<Post, RepoError>, op: &'static str) {
        match result {
            Ok(stored) => {
                if let Some(slot) = self.posts.iter_mut().find(|post| post.id == id) {
                    if *slot != stored {
                        debug!(id = %id, op, "adopting stored representation");
                        *slot = stored;
                        self.refresh_search_results();
                    }
                }
            }
            Err(err) => record_write_failure(op, id, &err),
        }
    }

    fn refresh_search_results(&mut self) {
        self.search_results = derive_search_results(&self.posts, &self.search);
    }
}

fn record_write_failure(op: &'static str, id: PostId, err: &RepoError) {
    warn!(op, id = %id, error = %err, "persisting post change failed; keeping local state");
    counter!(METRIC_PERSIST_FAILURES, "op" => op).increment(1);
}
