use std::{process, sync::Arc};

use blogdeck::{
    application::{
        error::AppError,
        navigation::NavigationHistory,
        store::PostStore,
    },
    config::{self, Command},
    infra::{build_repositories, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, debug, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?error.messages(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?error.messages(), "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let repositories = build_repositories(&settings.storage)?;
    let history = Arc::new(NavigationHistory::new());
    let mut store = PostStore::new(repositories.reader, repositories.writer, history.clone());

    store.mount().await;
    if let Some(message) = store.fetch_error() {
        eprintln!("error: {message}");
    }

    execute(&mut store, cli_args.command.unwrap_or_default()).await?;

    if let Some(route) = history.current() {
        debug!(route = %route, "final route");
    }
    Ok(())
}

async fn execute(store: &mut PostStore, command: Command) -> Result<(), AppError> {
    match command {
        Command::List { search } => {
            if let Some(term) = search {
                store.set_search(term);
            }
            print_json(store.search_results())?;
        }
        Command::Show { id } => match store.find_post(&id) {
            Some(post) => print_json(post)?,
            None => report_not_found(&id),
        },
        Command::New { title, body } => {
            ensure_posts_loaded(store)?;
            store.set_post_title(title);
            store.set_post_body(body);
            store.submit_new_post_form().await;
            print_json(store.search_results())?;
        }
        Command::Edit { id, title, body } => {
            ensure_posts_loaded(store)?;
            let Some(post_id) = store.begin_edit(&id).map(|post| post.id) else {
                report_not_found(&id);
                return Ok(());
            };
            if let Some(title) = title {
                store.set_edit_title(title);
            }
            if let Some(body) = body {
                store.set_edit_body(body);
            }
            store.submit_edit_form(post_id).await;
            print_json(store.search_results())?;
        }
        Command::Delete { id } => {
            ensure_posts_loaded(store)?;
            let Some(post_id) = store.find_post(&id).map(|post| post.id) else {
                report_not_found(&id);
                return Ok(());
            };
            store.delete_post(post_id).await;
            print_json(store.search_results())?;
        }
    }
    Ok(())
}

/// Writes replace the whole stored list, so a failed load must not be followed by one.
fn ensure_posts_loaded(store: &PostStore) -> Result<(), AppError> {
    match store.fetch_error() {
        Some(message) => Err(AppError::PostsUnavailable(message.to_string())),
        None => Ok(()),
    }
}

fn report_not_found(id: &str) {
    eprintln!("Post Not Found: no post with id `{id}`");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::unexpected(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use blogdeck::application::repos::PostsRepo;
    use blogdeck::infra::slot::{DEFAULT_SLOT_KEY, LocalSlotRepository};
    use tempfile::TempDir;

    use super::*;

    async fn store_over_slot(
        contents: Option<&str>,
    ) -> (TempDir, Arc<LocalSlotRepository>, PostStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let slot = Arc::new(LocalSlotRepository::new(dir.path(), DEFAULT_SLOT_KEY));
        if let Some(contents) = contents {
            std::fs::write(slot.slot_path(), contents).expect("seed slot");
        }
        let history = Arc::new(NavigationHistory::new());
        let mut store = PostStore::new(slot.clone(), slot.clone(), history);
        store.mount().await;
        (dir, slot, store)
    }

    #[tokio::test]
    async fn mutating_commands_refused_after_failed_load() {
        let (_dir, slot, mut store) = store_over_slot(Some("[{\"id\": 1,")).await;

        let commands = [
            Command::New {
                title: "A".into(),
                body: "x".into(),
            },
            Command::Edit {
                id: "1".into(),
                title: Some("B".into()),
                body: None,
            },
            Command::Delete { id: "1".into() },
        ];
        for command in commands {
            let err = execute(&mut store, command).await.expect_err("refused");
            assert!(matches!(err, AppError::PostsUnavailable(_)));
        }

        let raw = slot.read_raw().await.expect("read").expect("slot");
        assert_eq!(raw, "[{\"id\": 1,");
        assert!(store.posts().is_empty());
    }

    #[tokio::test]
    async fn listing_still_works_after_failed_load() {
        let (_dir, _slot, mut store) = store_over_slot(Some("not json")).await;
        execute(&mut store, Command::default()).await.expect("list");
    }

    #[tokio::test]
    async fn new_post_is_written_after_successful_load() {
        let (_dir, slot, mut store) = store_over_slot(None).await;
        execute(
            &mut store,
            Command::New {
                title: "A".into(),
                body: "x".into(),
            },
        )
        .await
        .expect("created");

        assert_eq!(slot.load_posts().await.expect("reload"), store.posts());
        assert_eq!(store.posts().len(), 1);
    }
}
