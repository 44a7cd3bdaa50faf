use std::{path::PathBuf, rc::Rc};

use anyhow::{anyhow, Context};
use msgboard_client::{
    api::AuthorId, AnnotatedMessage, BoardConfig, Feed, FeedState, KvStore, MemoryStore,
    MetadataCache, ProfileSource, Render, Session, DEFAULT_PAGE_SIZE, DEFAULT_PROFILE_URL,
};
use tracing_subscriber::EnvFilter;

mod store;

use store::FileStore;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Messages endpoint, eg. `http://localhost:3000/api`
    #[structopt(short, long)]
    host: String,

    #[structopt(long, default_value = DEFAULT_PROFILE_URL)]
    profile_api: String,

    #[structopt(long, env = "PROFILE_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    #[structopt(long, default_value = "12")]
    page_size: u64,

    /// File to keep author metadata and the last first page in. Nothing is
    /// kept across runs if unset.
    #[structopt(long)]
    cache: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the board, newest first
    List {
        /// Stop after this many pages
        #[structopt(long)]
        pages: Option<usize>,
    },

    /// Print the first page as last saved in the cache, without the network
    Cached,

    /// Post a message, then print the first page
    Post {
        /// Author id to post as
        author: String,

        comment: String,
    },

    /// Print the profile the token belongs to
    Whoami,
}

fn board_token() -> anyhow::Result<String> {
    std::env::var("BOARD_TOKEN").context("retrieving BOARD_TOKEN environment variable")
}

fn print(messages: &[AnnotatedMessage]) {
    for m in messages {
        println!(
            "#{} {} {} ({}): {}",
            m.message.id.0,
            m.message.created_at.format("%Y-%m-%d %H:%M"),
            m.display_name,
            m.message.author_id,
            m.message.comment,
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let cfg = BoardConfig {
        api_url: opt.host,
        profile_url: opt.profile_api,
        api_key: opt.api_key,
        page_size: if opt.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            opt.page_size
        },
    };
    let store: Rc<dyn KvStore> = match opt.cache {
        Some(path) => {
            let store = FileStore::open(path)?;
            tracing::debug!(path = ?store.path(), "using cache file");
            Rc::new(store)
        }
        None => Rc::new(MemoryStore::new()),
    };

    let client = reqwest::Client::new();
    let profiles = cfg.profiles(client.clone())?;
    let mut session = Session::new(
        Feed::new(cfg.page_size),
        MetadataCache::new(store),
        cfg.board(client)?,
        profiles.clone(),
    );

    match opt.cmd {
        Command::List { pages } => {
            let mut loaded = 0;
            let wants_more = |loaded| pages.map_or(true, |max| loaded < max);
            while wants_more(loaded) {
                match session.next_page().await {
                    Some(Render::Replace(page)) | Some(Render::Append(page)) => print(&page),
                    None => break,
                }
                loaded += 1;
            }
            // a failed fetch stops the loop without exhausting the feed
            if wants_more(loaded) && session.feed().state() != FeedState::Exhausted {
                return Err(anyhow!("failed fetching page {}", loaded + 1));
            }
        }
        Command::Cached => print(session.first_paint()),
        Command::Post { author, comment } => {
            let resp = session
                .post(&board_token()?, AuthorId(author), comment)
                .await
                .context("posting message")?;
            eprintln!("{}", resp.message);
            print(session.shown());
        }
        Command::Whoami => {
            let me = profiles
                .whoami(&board_token()?)
                .await
                .context("looking up token owner")?;
            println!("{} ({})", me.display_name, me.author_id);
        }
    }

    Ok(())
}
