use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use echostats::{cli, config, warning};

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
    /// Run the HTTP service
    Serve(ServeOptions),

    /// Fetch and print the listening summary for an access token
    Summary(SummaryOptions),

    /// Exchange an authorization code or refresh an access token
    Token(TokenOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Port to listen on (overrides PORT)
    #[clap(long)]
    pub port: Option<u16>,
}

#[derive(Parser, Debug, Clone)]
pub struct SummaryOptions {
    /// Spotify access token
    #[clap(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Refresh token, used once if the access token has expired
    #[clap(long, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// short_term, medium_term or long_term; anything else means short_term
    #[clap(long, default_value = "short_term")]
    pub time_range: String,

    /// Print the summary as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    #[clap(subcommand)]
    pub command: TokenCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TokenCommand {
    /// Exchange an authorization code for a token pair
    Exchange {
        /// Authorization code from the redirect
        #[clap(long)]
        code: String,

        /// Redirect uri used for the authorize request (defaults to SPOTIFY_REDIRECT_URI)
        #[clap(long)]
        redirect_uri: Option<String>,
    },

    /// Refresh an access token
    Refresh {
        #[clap(long, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.port).await,
        Command::Summary(opt) => {
            cli::summary(opt.token, opt.refresh_token, opt.time_range, opt.json).await
        }
        Command::Token(opt) => match opt.command {
            TokenCommand::Exchange { code, redirect_uri } => {
                cli::token::exchange(code, redirect_uri).await
            }
            TokenCommand::Refresh { refresh_token } => cli::token::refresh(refresh_token).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
