use anyhow::Result;
use clap::{Parser, Subcommand};
use docnav::document::markdown::load_markdown_file;
use docnav::outline::{OutlineContainer, build_outline};
use docnav::search::{SearchOptions, scan};
use docnav::utils::text::normalize_query;
use docnav::utils::{self, AppConfig};
use docnav::{logging, output};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "docnav")]
#[command(about = "Outline and as-you-type search for Markdown documentation pages")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Document to open (when no subcommand is given)
    file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a document in the interactive viewer
    View {
        /// Markdown file
        file: PathBuf,

        /// Initial search query
        #[arg(short, long)]
        query: Option<String>,

        /// Open at the section with this id (as in `#id` links)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Print the document outline (headings at levels 2 to 4)
    Outline {
        /// Markdown file
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Search the document and print matching elements
    Search {
        /// Markdown file
        file: PathBuf,

        /// Search query
        query: String,

        /// Print JSON instead of text
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Print the result panel as HTML
        #[arg(long)]
        html: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::View {
            file,
            query,
            section,
        }) => view(&file, query, section, cli.verbose),
        Some(Commands::Outline { file, json }) => {
            logging::init_stderr(cli.verbose)?;
            print_outline(&file, json)
        }
        Some(Commands::Search {
            file,
            query,
            json,
            html,
            no_color,
        }) => {
            logging::init_stderr(cli.verbose)?;
            let config = load_config(data_dir().as_deref());
            let format = if json {
                Format::Json
            } else if html {
                Format::Html
            } else {
                Format::Text { color: !no_color }
            };
            search(&file, &query, &config, format)
        }
        None => match cli.file {
            Some(file) => view(&file, None, None, cli.verbose),
            None => {
                eprintln!("Usage: docnav <FILE> or docnav --help");
                std::process::exit(2);
            }
        },
    }
}

/// App data directory, or None when it can't be created
fn data_dir() -> Option<PathBuf> {
    match utils::get_app_data_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            warn!(error = %e, "app data directory unavailable, settings will not persist");
            None
        }
    }
}

/// Load the config, falling back to defaults when it is missing or broken
fn load_config(dir: Option<&Path>) -> AppConfig {
    let Some(dir) = dir else {
        return AppConfig::default();
    };
    match AppConfig::load_from(dir) {
        Ok(config) => {
            debug!(?config, "config loaded");
            config
        }
        Err(e) => {
            warn!("using default config: {e:#}");
            AppConfig::default()
        }
    }
}

fn print_outline(file: &Path, json: bool) -> Result<()> {
    let mut doc = load_markdown_file(file)?;
    let mut sidebar = OutlineContainer::new();
    let outline = build_outline(&mut doc, Some(&mut sidebar));

    if json {
        output::print_json(&outline)?;
    } else {
        output::print_outline(&outline, std::io::stdout().is_terminal())?;
    }
    Ok(())
}

/// Output format of `search`
enum Format {
    Text { color: bool },
    Json,
    Html,
}

fn search(file: &Path, raw_query: &str, config: &AppConfig, format: Format) -> Result<()> {
    let options = SearchOptions::from(config);
    let query = normalize_query(raw_query);

    if query.chars().count() < options.min_query_chars {
        debug!(%query, "query too short, nothing to do");
        return Ok(());
    }

    let doc = load_markdown_file(file)?;
    let results = scan(&doc, &query, &options);

    match format {
        Format::Json => output::print_json(&results)?,
        Format::Html => output::print_html(&results, &query)?,
        Format::Text { color } => {
            output::print_results(&results, &query, color && std::io::stdout().is_terminal())?
        }
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn view(file: &Path, query: Option<String>, section: Option<String>, verbose: bool) -> Result<()> {
    use docnav::utils::UiState;

    // stderr belongs to the alternate screen while the viewer runs
    if let Err(e) = utils::get_log_path().and_then(|path| logging::init_file(&path, verbose)) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let dir = data_dir();

    let config = load_config(dir.as_deref());
    let state = dir.as_deref().map(UiState::load_from).unwrap_or_default();
    let doc = load_markdown_file(file)?;

    docnav::tui::run(file.to_path_buf(), doc, &config, state, dir, query, section)
}

#[cfg(not(feature = "interactive"))]
fn view(
    _file: &Path,
    _query: Option<String>,
    _section: Option<String>,
    _verbose: bool,
) -> Result<()> {
    anyhow::bail!("docnav was built without the interactive viewer; use `docnav outline` or `docnav search`")
}
