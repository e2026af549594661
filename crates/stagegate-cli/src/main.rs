// Rust guideline compliant 2026-10-15

//! Stagegate CLI Application
//!
//! Command-line interface for the gate transition and WIP enforcement engine.

use clap::Parser;
use stagegate_app::{AppError, ErrorEnvelope, RepoContext};
use stagegate_cli::commands::{self, wip::WipAction};
use stagegate_cli::{create_formatter, logging, output_mode, should_use_color};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "sgate",
    version,
    about = "Stagegate: gate reviews with WIP limits",
    long_about = "Stagegate moves ideas through SPARK, SEED, SCAFFOLD, SHIP and SCALE. Every move is checked against gate criteria and per-pod, cross-pod and portfolio WIP limits.",
    after_help = "Examples:\n  sgate init\n  sgate create \"Async design reviews\" --pod platform --fact owner=ines\n  sgate fact idea-abc123 strategic_fit 4\n  sgate promote idea-abc123 seed --dry-run\n  sgate promote idea-abc123 seed --comments \"Strong signal\"\n  sgate wip list --exceeded\n  sgate wip set 8 --gate seed --pod ratio\n"
)]
struct Cli {
    /// Enable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Output format
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Repository root (defaults to the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Plain,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Initialize a new Stagegate repository
    Init,

    /// Create a new SPARK item
    Create {
        /// Title of the item
        title: String,

        /// Owning pod
        #[arg(long)]
        pod: Option<String>,

        /// Initial fact as key=value (repeatable)
        #[arg(long)]
        fact: Vec<String>,

        /// Author of the item
        #[arg(long)]
        author: Option<String>,
    },

    /// Show details of an item
    Show {
        /// Item ID (full or partial)
        id: String,
    },

    /// List items
    List {
        /// Filter by gate
        #[arg(long)]
        gate: Option<String>,

        /// Filter by pod
        #[arg(long)]
        pod: Option<String>,

        /// Only items in an active gate
        #[arg(long)]
        live: bool,

        /// Only items past their review date
        #[arg(long)]
        overdue: bool,

        /// Filter by author
        #[arg(long)]
        author: Option<String>,

        /// Sort by field
        #[arg(long)]
        sort: Option<String>,
    },

    /// Move an item to another gate
    Promote {
        /// Item ID
        id: String,

        /// Target gate
        target: String,

        /// Skip entry and exit criteria (sequencing and WIP limits still apply)
        #[arg(long = "override")]
        override_checks: bool,

        /// Reviewer comments
        #[arg(long)]
        comments: Option<String>,

        /// Reviewer recorded on the transition
        #[arg(long)]
        actor: Option<String>,

        /// Report what would happen without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Record a failed gate review without moving the item
    Reject {
        /// Item ID
        id: String,

        /// Why the review failed
        reason: String,

        /// Reviewer recorded on the transition
        #[arg(long)]
        actor: Option<String>,
    },

    /// Show the transition history of an item
    History {
        /// Item ID
        id: String,
    },

    /// Record a fact on an item
    Fact {
        /// Item ID
        id: String,

        /// Fact key
        key: String,

        /// Fact value (JSON, or plain text)
        value: String,
    },

    /// Move an item to another pod
    Assign {
        /// Item ID
        id: String,

        /// New pod (omit to clear)
        pod: Option<String>,
    },

    /// Inspect and manage WIP limits
    Wip {
        #[command(subcommand)]
        action: WipAction,
    },

    /// Show item counts per gate
    Metrics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = RepoContext::discover(cli.repo.as_deref())
        .and_then(|repo| repo.load_config())
        .ok();
    logging::init(config.as_ref().map_or("info", |c| c.log_level.as_str()));

    let use_color = !cli.no_color && should_use_color();
    let format = match cli.format {
        Some(OutputFormat::Json) => "json",
        Some(OutputFormat::Table) => "table",
        Some(OutputFormat::Plain) => "plain",
        None if cli.json => "json",
        None => match config.as_ref().map(|c| c.output_format) {
            Some(stagegate_core::OutputFormat::Json) => "json",
            Some(stagegate_core::OutputFormat::Plain) => "plain",
            _ => "table",
        },
    };
    output_mode::set_json_output(format == "json");
    let formatter = create_formatter(format, use_color);

    match run(cli.command, cli.repo.as_deref(), formatter.as_ref()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(error) => {
            if output_mode::is_json_output() {
                let envelope = match error.downcast_ref::<AppError>() {
                    Some(app) => serde_json::to_string(&ErrorEnvelope::from_error(app)).ok(),
                    None => None,
                };
                match envelope {
                    Some(json) => println!("{}", json),
                    None => println!("{}", formatter.format_error(&format!("{:#}", error))),
                }
            } else {
                eprintln!("{}", formatter.format_error(&format!("{:#}", error)));
            }
            ExitCode::FAILURE
        }
    }
}

/// Dispatches a command; `Ok(false)` means it ran but was refused.
fn run(
    command: Commands,
    repo: Option<&std::path::Path>,
    formatter: &dyn stagegate_cli::OutputFormatter,
) -> anyhow::Result<bool> {
    match command {
        Commands::Init => commands::init::execute(repo)?,
        Commands::Create {
            title,
            pod,
            fact,
            author,
        } => return commands::create::execute(repo, title, pod, fact, author),
        Commands::Show { id } => commands::show::execute(repo, id, formatter)?,
        Commands::List {
            gate,
            pod,
            live,
            overdue,
            author,
            sort,
        } => commands::list::execute(repo, gate, pod, live, overdue, author, sort, formatter)?,
        Commands::Promote {
            id,
            target,
            override_checks,
            comments,
            actor,
            dry_run,
        } => {
            return commands::promote::execute(
                repo,
                id,
                target,
                override_checks,
                comments,
                actor,
                dry_run,
                formatter,
            )
        }
        Commands::Reject { id, reason, actor } => {
            commands::reject::execute(repo, id, reason, actor)?
        }
        Commands::History { id } => commands::history::execute(repo, id, formatter)?,
        Commands::Fact { id, key, value } => {
            commands::fact::execute(repo, id, key, value, formatter)?
        }
        Commands::Assign { id, pod } => return commands::assign::execute(repo, id, pod),
        Commands::Wip { action } => commands::wip::execute(repo, action, formatter)?,
        Commands::Metrics => commands::metrics::execute(repo, formatter)?,
    }
    Ok(true)
}
