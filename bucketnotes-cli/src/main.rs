//! bucketnotes CLI
//!
//! Keeps short titled notes in a bucket of a local store file. Without a
//! subcommand an interactive menu is started; the subcommands run a single
//! action and exit.

mod menu;
mod settings;

use bucketnotes_core::{BucketnotesError, Notebook, StoreConfig};
use clap::{Parser, Subcommand};
use log::{debug, error};
use settings::AppSettings;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bucketnotes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep short titled notes in named buckets")]
#[command(long_about = "bucketnotes - titled notes in named buckets\n\n\
    Every bucket is an isolated set of notes inside one store file.\n\
    Pick a bucket with -b; without a subcommand an interactive menu starts.\n\n\
    Examples:\n\
      bucketnotes -b alice\n\
      bucketnotes -b alice add todo \"buy milk\" alice\n\
      bucketnotes -b alice show todo\n\
      bucketnotes -b alice list")]
pub struct Cli {
    /// Bucket to work in (falls back to the saved default)
    #[arg(short = 'b', long = "bucket", value_name = "NAME")]
    pub bucket: Option<String>,

    /// Store file (falls back to the saved default)
    #[arg(long = "db", value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a note, replacing any note with the same title
    Add {
        title: String,
        content: String,
        author: String,
    },

    /// Print one note
    Show { title: String },

    /// List every title in the bucket
    List,

    /// Print the effective store file and bucket
    Config {
        /// Save the given -b/--db values as the new defaults
        #[arg(long)]
        save: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("event=cli_exit status=error fatal={} error={e}", e.is_fatal());
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli) -> bucketnotes_core::Result<()> {
    let settings = settings::load_settings();
    let config = store_config(&cli, &settings);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        None => with_notebook(&config, |notebook| {
            let stdin = io::stdin();
            menu::run_menu(notebook, &mut stdin.lock(), &mut out)
        }),
        Some(Commands::Add {
            title,
            content,
            author,
        }) => with_notebook(&config, |notebook| {
            notebook.create_note(&title, &content, &author)
        }),
        Some(Commands::Show { title }) => with_notebook(&config, |notebook| {
            menu::print_note(notebook, &title, &mut out)
        }),
        Some(Commands::List) => with_notebook(&config, |notebook| {
            for title in notebook.list_titles()? {
                writeln!(out, "{}", title?)?;
            }
            Ok(())
        }),
        Some(Commands::Config { save }) => show_config(
            &config,
            settings,
            save,
            &settings::settings_file_path(),
            &mut out,
        ),
    }
}

/// Opens the notebook, runs `action`, then closes it.
///
/// The notebook is closed even when the action fails; the action's error wins.
fn with_notebook<F>(config: &StoreConfig, action: F) -> bucketnotes_core::Result<()>
where
    F: FnOnce(&mut Notebook) -> bucketnotes_core::Result<()>,
{
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut notebook = Notebook::open(config)?;
    debug!(
        "event=cli_start path={} namespace={}",
        notebook.path().display(),
        notebook.namespace()
    );

    let outcome = action(&mut notebook);
    let closed = notebook.close();
    outcome?;
    closed
}

/// Prints the effective store file and bucket, optionally saving them as the
/// new defaults in `settings_path`.
fn show_config(
    config: &StoreConfig,
    mut settings: AppSettings,
    save: bool,
    settings_path: &Path,
    out: &mut impl Write,
) -> bucketnotes_core::Result<()> {
    writeln!(out, "Store file: {}", config.path.display())?;
    writeln!(out, "Bucket: {}", config.namespace)?;
    if save {
        settings.database_path = config.path.to_string_lossy().to_string();
        settings.default_namespace = Some(config.namespace.clone()).filter(|ns| !ns.is_empty());
        settings::save_settings_to(&settings, settings_path)
            .map_err(|msg| BucketnotesError::Io(io::Error::other(msg)))?;
        writeln!(out, "Saved to {}", settings_path.display())?;
    }
    Ok(())
}

/// Resolves the store file and bucket from arguments, then saved settings.
fn store_config(cli: &Cli, settings: &AppSettings) -> StoreConfig {
    let path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.database_path));
    let namespace = cli
        .bucket
        .clone()
        .or_else(|| settings.default_namespace.clone())
        .unwrap_or_default();
    StoreConfig::new(path, namespace)
}
