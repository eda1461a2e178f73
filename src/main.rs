use clap::{Parser, Subcommand};
use inklab::config;
use inklab::contact::TracingSink;
use inklab::entity::{Artist, PortfolioPiece};
use inklab::repository::ContentRepository;
use inklab::server::{self, AppState};
use inklab::{output, sitemap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inklab")]
#[command(about = "Tattoo studio site served from flat MDX content")]
#[command(long_about = "\
Tattoo studio site served from flat MDX content

Every page is rendered from the content directory on request; there is no
build step and no database. Edit a file and reload.

Content structure:

  content/
  ├── site.toml                    # Site config (optional)
  ├── portfolio/
  │   ├── koi-sleeve.mdx           # Piece: front-matter + markdown body
  │   └── geometric-mandala.mdx
  └── artists/
      ├── ana-perez.mdx            # Artist profile
      └── luis-gomez.mdx

The file stem is the slug: portfolio/koi-sleeve.mdx is served at
/portfolio/koi-sleeve. Files that fail to parse are left out of every
listing; run 'inklab check' to see which and why.

Run 'inklab gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides site.toml)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides site.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load every content file and report what would be served
    Check,
    /// Print the sitemap XML
    Sitemap,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve { host, port } => {
            let mut site_config = config::load_config(&cli.source)?;
            if let Some(host) = host {
                site_config.server.host = host;
            }
            if let Some(port) = port {
                site_config.server.port = port;
            }
            let state = AppState::new(
                ContentRepository::new(&cli.source),
                site_config,
                Arc::new(TracingSink),
            );
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(server::serve(state))?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            config::load_config(&cli.source)?;
            let repository = ContentRepository::new(&cli.source);
            let pieces = repository.load_report::<PortfolioPiece>()?;
            let artists = repository.load_report::<Artist>()?;
            output::print_check_output(&pieces, &artists, &cli.source);

            let excluded = pieces.failures.len() + artists.failures.len();
            if excluded > 0 {
                return Err(format!("{excluded} content file(s) failed to load").into());
            }
            println!("==> Content is valid");
        }
        Command::Sitemap => {
            let site_config = config::load_config(&cli.source)?;
            let pieces = ContentRepository::new(&cli.source).all_portfolio_pieces();
            let entries = sitemap::entries(site_config.site.base_url(), &pieces, chrono::Utc::now());
            println!("{}", sitemap::render(&entries));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so `sitemap` and `gen-config` output stays clean.
/// Filter with `RUST_LOG`; defaults to `info,tower_http=warn`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
