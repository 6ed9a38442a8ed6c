use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotapi::{
    cli::{self, PlayerCommand},
    config, error,
    types::SearchType,
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Show the signed-in user
    Me,

    /// Handle artists
    Artists(ArtistsOptions),

    /// Search the catalog
    Search(SearchOptions),

    /// List your playlists
    Playlists,

    /// Control playback
    #[command(subcommand)]
    Player(PlayerCommand),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsOptions {
    #[command(subcommand)]
    pub command: ArtistsSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArtistsSubcommand {
    /// List followed artists
    Followed(FollowedOpts),

    /// Show one artist
    Show(ShowOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct FollowedOpts {
    /// Filter artists by name
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOpts {
    /// Spotify artist id
    pub id: String,

    /// Also list the artist's releases
    #[clap(long)]
    pub releases: bool,

    /// Release type(s) to include; comma separated or `all`
    #[clap(
        long = "type",
        default_value = "album",
        value_parser = utils::parse_release_kinds,
        action = ArgAction::Set,
        num_args = 1
    )]
    pub release_types: utils::ReleaseKinds,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    pub query: String,

    /// Restrict results to one type
    #[clap(long = "type", value_enum)]
    pub kind: Option<SearchType>,

    /// Results per type
    #[clap(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Me => cli::me().await,
        Command::Artists(opt) => match opt.command {
            ArtistsSubcommand::Followed(f) => cli::followed_artists(f.search).await,
            ArtistsSubcommand::Show(s) => {
                cli::show_artist(&s.id, s.releases, &s.release_types).await
            }
        },
        Command::Search(opt) => cli::search(&opt.query, opt.kind, opt.limit).await,
        Command::Playlists => cli::playlists().await,
        Command::Player(command) => cli::player(command).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
