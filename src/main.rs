use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use mindbeat::{cli, config, error, warning};

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
    /// Print debug diagnostics (overrides RUST_LOG)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Remove the stored Spotify credential
    Logout,

    /// Show whether a credential is stored and still valid
    Status,

    /// Analyse the mood of your recent listening
    Mood(MoodOptions),

    /// Show recommendations for your current mood
    Recommend(RecommendOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct MoodOptions {
    /// Number of recent plays to analyse (1-50)
    #[clap(long)]
    pub limit: Option<u32>,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendOptions {
    /// Number of recent plays to analyse (1-50)
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mindbeat=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load .env file. Err: {}", e);
    }

    let settings = match config::Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&settings).await,
        Command::Logout => cli::logout(&settings).await,
        Command::Status => cli::status(&settings).await,
        Command::Mood(opt) => cli::mood(&settings, opt.limit, opt.json).await,
        Command::Recommend(opt) => cli::recommend(&settings, opt.limit).await,
        Command::Completions(_) => {}
    }
}
