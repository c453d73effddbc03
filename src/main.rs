use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use linkfollow::config::{Priority, Settings};
use linkfollow::dispatch::{Dispatcher, FollowOutcome};
use linkfollow::host::{Editor, FileSystem, NativeFileSystem, PathKind, Severity};
use linkfollow::link::{classify, UrlPattern};

#[derive(Parser, Debug)]
#[command(name = "linkfollow", version, about = "Classify, resolve and follow note links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the kind of a link and its target
    Classify {
        link: String,
    },
    /// Print the path a link resolves to
    Resolve {
        link: String,
        #[command(flatten)]
        from: FromArgs,
    },
    /// Follow a link: print buffers to open, spawn the opener for files and URLs
    Follow {
        link: String,
        #[command(flatten)]
        from: FromArgs,
        /// Print what the opener would be given instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug)]
struct FromArgs {
    /// The document the link appears in
    #[arg(long, value_name = "PATH")]
    from: PathBuf,

    /// Override the configured perspective
    #[arg(long, value_enum)]
    perspective: Option<PerspectiveArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PerspectiveArg {
    Current,
    First,
    Root,
}

impl From<PerspectiveArg> for Priority {
    fn from(value: PerspectiveArg) -> Self {
        match value {
            PerspectiveArg::Current => Priority::Current,
            PerspectiveArg::First => Priority::First,
            PerspectiveArg::Root => Priority::Root,
        }
    }
}

/// Stands in for an editor: "opening" a buffer prints its path.
struct TerminalEditor {
    document: PathBuf,
}

impl Editor for TerminalEditor {
    fn open_buffer(&mut self, path: &str) -> Result<()> {
        println!("open {path}");
        Ok(())
    }

    fn current_document_path(&self) -> Option<PathBuf> {
        Some(self.document.clone())
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }

    fn jump_to_heading(&mut self, heading: &str) {
        println!("jump #{heading}");
    }
}

struct DryRunFileSystem(NativeFileSystem);

impl FileSystem for DryRunFileSystem {
    fn path_exists(&self, path: &Path, kind: PathKind) -> bool {
        self.0.path_exists(path, kind)
    }

    fn make_directories(&self, path: &Path) -> Result<()> {
        println!("mkdir {}", path.display());
        Ok(())
    }

    fn open_with_default_application(&self, target: &str) -> Result<()> {
        println!("external {target}");
        Ok(())
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(from: &FromArgs) -> Result<Settings> {
    let dir = from
        .from
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut settings = Settings::new(dir)?;
    if let Some(perspective) = from.perspective {
        settings.perspective.priority = perspective.into();
    }
    Ok(settings)
}

fn run<F: FileSystem>(link: &str, from: &FromArgs, fs: F) -> Result<()> {
    let settings = load_settings(from)?;
    let editor = TerminalEditor {
        document: from.from.clone(),
    };
    let mut dispatcher = Dispatcher::new(settings, editor, fs);
    match dispatcher.follow(link) {
        FollowOutcome::Abandoned(message) => Err(anyhow!(message)),
        _ => Ok(()),
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { link } => {
            let link = classify(&link, &UrlPattern);
            println!("{}\t{}", link.kind, link.target);
        }
        Commands::Resolve { link, from } => {
            let settings = load_settings(&from)?;
            let editor = TerminalEditor {
                document: from.from.clone(),
            };
            let mut dispatcher = Dispatcher::new(settings, editor, NativeFileSystem::default());
            dispatcher.observe_document(&from.from);
            match dispatcher.resolve(&link)? {
                Some(resolved) => match resolved.anchor {
                    Some(anchor) => println!("{}#{anchor}", resolved.path),
                    None => println!("{}", resolved.path),
                },
                None => println!("{link}"),
            }
        }
        Commands::Follow {
            link,
            from,
            dry_run,
        } => {
            if dry_run {
                run(&link, &from, DryRunFileSystem(NativeFileSystem::default()))?;
            } else {
                run(&link, &from, NativeFileSystem::default())?;
            }
        }
    }

    Ok(())
}
