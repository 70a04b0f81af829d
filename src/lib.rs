//! blogdeck: a blog post store with derived search, local-slot or REST
//! persistence, and a guarded initial fetch.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub(crate) mod util;
