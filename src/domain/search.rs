//! Text search over the post list.

use super::posts::Post;

/// Posts whose title or body contains `term` (case-insensitive), most
/// recently appended first. An empty term matches every post.
pub fn derive_search_results(posts: &[Post], term: &str) -> Vec<Post> {
    let needle = term.to_lowercase();
    posts
        .iter()
        .rev()
        .filter(|post| matches_term(post, &needle))
        .cloned()
        .collect()
}

fn matches_term(post: &Post, needle: &str) -> bool {
    post.body.to_lowercase().contains(needle) || post.title.to_lowercase().contains(needle)
}
