//! Command handlers. Each builds a [`Board`] from the URL argument and
//! drives one engine operation, printing the result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use bbs_config::BbsConfig;
use bbs_core::collab::{NoSession, SessionSource, StaticSession};
use bbs_core::entities::{EntryPatch, PostAttempt};
use bbs_core::{Board, BoardVariant};
use bbs_post::Poster;
use bbs_store::MirrorStore;
use bbs_sync::Synchronizer;
use bbs_transport::HttpTransport;
use serde::Serialize;

use crate::cli::Commands;
use crate::session;

/// Everything a command needs, built once per invocation.
pub struct Context {
    config: BbsConfig,
    store: MirrorStore,
    transport: HttpTransport,
    session: Arc<dyn SessionSource>,
    variant: BoardVariant,
}

impl Context {
    pub fn init(
        config: BbsConfig,
        store_override: Option<PathBuf>,
        variant: BoardVariant,
    ) -> anyhow::Result<Self> {
        let root = store_override.unwrap_or_else(|| config.store.root.clone());
        let store = MirrorStore::open(&root)
            .with_context(|| format!("failed to open store at {}", root.display()))?;
        let transport =
            HttpTransport::new(&config.transport).context("failed to build HTTP client")?;

        let session: Arc<dyn SessionSource> = match session::resolve_token(
            &config.session,
            session::session_file_path().as_deref(),
        ) {
            Some(token) => Arc::new(StaticSession(token)),
            None => Arc::new(NoSession),
        };

        Ok(Self {
            config,
            store,
            transport,
            session,
            variant,
        })
    }

    fn board(&self, url: &str) -> anyhow::Result<Board> {
        Ok(Board::from_url(url, url, self.variant)?)
    }

    fn synchronizer(&self) -> Synchronizer<&HttpTransport> {
        Synchronizer::new(&self.transport, self.store.clone()).with_session(self.session.clone())
    }

    fn poster(&self) -> Poster<&HttpTransport> {
        Poster::new(&self.transport, self.store.clone(), &self.config.posting)
            .with_session(self.session.clone())
    }
}

#[derive(Serialize)]
struct ListingReport<'a> {
    modified: bool,
    entries: &'a [bbs_core::entities::ThreadIndexEntry],
}

pub async fn dispatch(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Subjects { board_url } => {
            let board = ctx.board(&board_url)?;
            let outcome = ctx.synchronizer().sync_board(&board).await?;
            output(&ListingReport {
                modified: outcome.is_modified(),
                entries: outcome.entries(),
            })
        }
        Commands::Thread { board_url, file } => {
            let board = ctx.board(&board_url)?;
            let outcome = ctx.synchronizer().fetch_thread(&board, &file).await?;
            output(&outcome)
        }
        Commands::Post {
            board_url,
            thread,
            subject,
            body,
            name,
            mail,
        } => {
            let board = ctx.board(&board_url)?;
            let attempt = match thread {
                Some(key) => PostAttempt::reply(board, key, body),
                None => PostAttempt::new_thread(board, subject.unwrap_or_default(), body),
            }
            .with_author(name)
            .with_contact(mail);
            let outcome = ctx.poster().submit(&attempt).await?;
            output(&outcome)
        }
        Commands::Entries { board_url } => {
            let board = ctx.board(&board_url)?;
            output(&ctx.store.list(&board)?)
        }
        Commands::MarkRead {
            board_url,
            file,
            marker,
        } => {
            let board = ctx.board(&board_url)?;
            let patch = EntryPatch {
                read_marker: Some(marker),
                position_hint: None,
            };
            output(&ctx.store.patch_entry(&board, &file, patch)?)
        }
    }
}

fn output<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
