//! Page through a Fennec library from the terminal.
//!
//! ```text
//! FENNEC_SERVER_URL=https://media.example.com FENNEC_USER_ID=... FENNEC_ACCESS_TOKEN=... \
//!     fennec-browse --kind Movie --search alien --pages 2
//! ```

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use fennec_config::logging::{DEFAULT_DIRECTIVES, init_tracing};
use fennec_config::{ConfigLoader, ConfigProvider};
use fennec_contracts::element::Element;
use fennec_contracts::fetcher::PageFetcher;
use fennec_contracts::session::AuthenticatedSession;
use fennec_core::fetchers::{ItemsFetcher, LibraryParent, NextUpFetcher, ParentKind, PeopleFetcher, ResumeFetcher};
use fennec_core::{LibraryEvent, LibraryState, PagingHandle, PagingOptions, PagingSession};
use fennec_model::{BaseItem, ElementId, ItemFilterCollection, ItemKind, Person};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RANDOM_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Listing {
    Items,
    NextUp,
    Resume,
    People,
}

#[derive(Parser, Debug)]
#[command(name = "fennec-browse")]
#[command(about = "List library items from a Jellyfin-compatible server, one page at a time")]
struct Cli {
    /// Config file (TOML or JSON). Defaults to $FENNEC_CONFIG_PATH or ./fennec.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Listing::Items)]
    listing: Listing,

    /// Library, collection or folder id to browse into.
    #[arg(long)]
    parent: Option<String>,

    /// Only list direct children of --parent.
    #[arg(long, requires = "parent")]
    folder: bool,

    #[arg(long)]
    search: Option<String>,

    /// Item kinds to include, e.g. Movie or Series. Repeatable.
    #[arg(long = "kind")]
    kinds: Vec<ItemKind>,

    /// Number of pages to print.
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Overrides paging.page_size.
    #[arg(long)]
    page_size: Option<usize>,

    /// Print one random element instead of paging.
    #[arg(long)]
    random: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(DEFAULT_DIRECTIVES)?;

    let load = ConfigLoader::new().with_config_path(cli.config.clone()).load()?;
    debug!(source = ?load.source, "configuration ready");

    let session: Arc<dyn AuthenticatedSession> = Arc::new(load.config.server.user_session()?);
    let mut options = load.paging_options();
    if let Some(page_size) = cli.page_size {
        options = options.with_page_size(page_size);
    }

    let mut filters = ItemFilterCollection {
        item_kinds: cli.kinds.clone(),
        ..ItemFilterCollection::default()
    };
    if let Some(search) = &cli.search {
        filters = filters.with_query(search.clone());
    }

    match cli.listing {
        Listing::Items => {
            let parent = cli
                .parent
                .as_deref()
                .map(|id| -> anyhow::Result<LibraryParent> {
                    let id = ElementId::new(id).context("invalid --parent id")?;
                    let kind = if cli.folder {
                        ParentKind::Folder
                    } else {
                        ParentKind::CollectionFolder
                    };
                    Ok(LibraryParent::new(id, kind))
                })
                .transpose()?;
            let fetcher: Arc<dyn PageFetcher<Element = BaseItem>> = Arc::new(ItemsFetcher::new(parent));
            browse(fetcher, session, options, filters, &cli).await
        }
        Listing::NextUp => {
            let fetcher: Arc<dyn PageFetcher<Element = BaseItem>> = Arc::new(NextUpFetcher::new());
            browse(fetcher, session, options, filters, &cli).await
        }
        Listing::Resume => {
            let fetcher: Arc<dyn PageFetcher<Element = BaseItem>> = Arc::new(ResumeFetcher::new());
            browse(fetcher, session, options, filters, &cli).await
        }
        Listing::People => {
            let fetcher: Arc<dyn PageFetcher<Element = Person>> = Arc::new(PeopleFetcher::new());
            browse(fetcher, session, options, filters, &cli).await
        }
    }
}

async fn browse<E: Element>(
    fetcher: Arc<dyn PageFetcher<Element = E>>,
    session: Arc<dyn AuthenticatedSession>,
    options: PagingOptions,
    filters: ItemFilterCollection,
    cli: &Cli,
) -> anyhow::Result<()> {
    let handle = PagingSession::new(fetcher, session, options).with_filters(filters).spawn();
    let result = if cli.random {
        print_random(&handle).await
    } else {
        print_pages(&handle, cli.pages).await
    };
    handle.shutdown().await;
    result
}

async fn print_pages<E: Element>(handle: &PagingHandle<E>, pages: usize) -> anyhow::Result<()> {
    handle.refresh()?;
    let mut printed = 0;

    for page in 0..pages {
        let snapshot = handle
            .wait_for(|snapshot| {
                snapshot.current_page >= Some(page)
                    && !matches!(snapshot.state, LibraryState::Initial | LibraryState::Refreshing)
                    && !snapshot.is_loading_more()
            })
            .await?;

        if let LibraryState::Error(err) = &snapshot.state {
            bail!("{err}");
        }
        for element in snapshot.elements.iter().skip(printed) {
            println!("{}", element.display_title());
        }
        printed = snapshot.len();

        if !snapshot.has_next_page {
            break;
        }
        if page + 1 < pages {
            handle.get_next_page()?;
        }
    }

    if printed == 0 {
        println!("(no results)");
    }
    Ok(())
}

async fn print_random<E: Element>(handle: &PagingHandle<E>) -> anyhow::Result<()> {
    let mut events = handle.subscribe_events();
    handle.get_random_element()?;

    match tokio::time::timeout(RANDOM_TIMEOUT, events.recv()).await {
        Ok(Ok(LibraryEvent::RetrievedRandomElement(element))) => println!("{}", element.display_title()),
        Ok(Err(err)) => bail!("paging session stopped: {err}"),
        // Random failures are silent; all we can report is that nothing came back.
        Err(_) => println!("(no random element)"),
    }
    Ok(())
}
