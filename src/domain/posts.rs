use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// `March 05, 2024 3:07:09 PM`
pub const POST_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month repr:long] [day], [year] [hour repr:12 padding:none]:[minute]:[second] [period]"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    pub const FIRST: PostId = PostId(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// `None` once the id space is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Route parameters are strings; a post matches when its decimal form is
    /// exactly the parameter.
    pub fn matches_route_param(self, param: &str) -> bool {
        self.0.to_string() == param
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub datetime: String,
    pub body: String,
}

impl Post {
    pub fn new(
        id: PostId,
        title: impl Into<String>,
        body: impl Into<String>,
        datetime: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            datetime: datetime.into(),
            body: body.into(),
        }
    }
}

/// Id for the next appended post: one past the largest id, or 1 for an empty list.
/// Returns `None` when the largest id is already `u64::MAX`.
pub fn next_post_id(posts: &[Post]) -> Option<PostId> {
    match posts.iter().map(|post| post.id).max() {
        Some(largest) => largest.next(),
        None => Some(PostId::FIRST),
    }
}

pub fn find_by_route_param<'a>(posts: &'a [Post], param: &str) -> Option<&'a Post> {
    posts.iter().find(|post| post.id.matches_route_param(param))
}

pub fn format_post_datetime(at: OffsetDateTime) -> String {
    // Every component in the description is always available on OffsetDateTime.
    at.format(POST_DATETIME_FORMAT).unwrap_or_default()
}

/// Current local time in post format, falling back to UTC when the local
/// offset is unavailable.
pub fn current_post_datetime() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_post_datetime(now)
}
