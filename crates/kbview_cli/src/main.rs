//! Command-line entry point over `kbview_core`.
//!
//! # Responsibility
//! - Run the reconciliation use-cases over backend JSON payloads on disk.
//! - Print deterministic, indented output for local inspection.

use clap::{Parser, Subcommand};
use kbview_core::{
    assemble_comments, decode_batch, dedupe_feed, CommentNode, CommentRecord, ConfigError,
    CoreConfig, DocumentOutline, DocumentRecord, FeedEvent, InvalidInputError, LoggingError,
    RenderedElement,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "kbview", version, about = "Knowledge-base view reconciliation tools")]
struct Cli {
    /// JSON config file. `KBVIEW_*` environment variables override it.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for rolling log files. Logging stays off when unset.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of indented text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// Build the sidebar outline from a document batch.
    Outline {
        #[arg(value_name = "DOCS_JSON")]
        path: PathBuf,
    },
    /// Assemble reply threads from a comment batch.
    Comments {
        #[arg(value_name = "COMMENTS_JSON")]
        path: PathBuf,
    },
    /// Collapse repeated activity in a feed batch.
    Feed {
        #[arg(value_name = "FEED_JSON")]
        path: PathBuf,
    },
    /// Extract the heading outline from rendered content.
    Headings {
        #[arg(value_name = "CONTENT_JSON")]
        path: PathBuf,
    },
}

#[derive(Debug)]
enum CliError {
    Read { path: PathBuf, source: std::io::Error },
    Config(ConfigError),
    Logging(LoggingError),
    Input(InvalidInputError),
    Content(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Input(err) => write!(f, "{err}"),
            Self::Content(err) => write!(f, "invalid content tree: {err}"),
            Self::Encode(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<InvalidInputError> for CliError {
    fn from(value: InvalidInputError) -> Self {
        Self::Input(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kbview: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    if config.init_logging()? {
        info!(
            "event=cli_start module=cli status=ok version={}",
            kbview_core::core_version()
        );
    }

    match &cli.command {
        Command::Ping => {
            println!("kbview_core ping={}", kbview_core::ping());
            println!("kbview_core version={}", kbview_core::core_version());
        }
        Command::Outline { path } => {
            let records: Vec<DocumentRecord> = decode_batch(&read(path)?)?;
            let outline = DocumentOutline::build_with(config.forest_builder(), records);
            if cli.json {
                print_json(&outline.into_nested())?;
            } else {
                for entry in outline.entries() {
                    let slug = entry.document.slug.as_deref().unwrap_or("-");
                    println!(
                        "{}{} [{}]",
                        indent(entry.depth),
                        entry.document.title,
                        slug
                    );
                }
            }
        }
        Command::Comments { path } => {
            let comments: Vec<CommentRecord> = decode_batch(&read(path)?)?;
            let thread = assemble_comments(comments);
            if cli.json {
                print_json(&thread.roots)?;
            } else {
                println!("{} comments", thread.total_count);
                for root in &thread.roots {
                    print_comment(root);
                }
            }
        }
        Command::Feed { path } => {
            let events: Vec<FeedEvent> = decode_batch(&read(path)?)?;
            let events = dedupe_feed(events);
            if cli.json {
                print_json(&events)?;
            } else {
                for event in &events {
                    let title = event.subject_title.as_deref().unwrap_or(&event.subject_id);
                    println!("{} {} {}", event.timestamp, event.action_type, title);
                }
            }
        }
        Command::Headings { path } => {
            let mut content: RenderedElement =
                serde_json::from_str(&read(path)?).map_err(CliError::Content)?;
            let headings = config.heading_extractor().extract(&mut content);
            if cli.json {
                print_json(&serde_json::json!({
                    "headings": headings,
                    "content": content,
                }))?;
            } else {
                for heading in &headings {
                    let depth = usize::from(heading.level.get().saturating_sub(1));
                    println!("{}{} #{}", indent(depth), heading.text, heading.id);
                }
            }
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CoreConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    }
    .with_env_overrides();
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn print_comment(root: &CommentNode) {
    let mut stack = vec![(0_usize, root)];
    while let Some((depth, node)) = stack.pop() {
        println!(
            "{}#{} user={} {}",
            indent(depth),
            node.payload.id,
            node.payload.author_id,
            node.payload.body
        );
        stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Encode)?;
    println!("{text}");
    Ok(())
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
