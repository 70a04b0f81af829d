use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("posts could not be loaded, refusing to modify them: {0}")]
    PostsUnavailable(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status used by the binary when this error ends a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Infra(_) | AppError::PostsUnavailable(_) | AppError::Unexpected(_) => 1,
        }
    }

    /// Error chain, outermost first.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_usage_status() {
        let err = AppError::from(LoadError::invalid("storage.key", "must not be empty"));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
        assert_eq!(AppError::PostsUnavailable("bad slot".into()).exit_code(), 1);
    }

    #[test]
    fn messages_walk_the_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::from(InfraError::from(io));
        assert_eq!(err.messages(), vec!["io error: gone", "gone"]);
    }
}
