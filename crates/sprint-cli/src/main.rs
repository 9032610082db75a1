mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sprint",
    about = "File-backed kanban board and sprint tracker with GitHub issue sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory with .sprint.json)
    #[arg(long, global = true, env = "SPRINT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .sprint.json and an empty sprint data file
    Init {
        /// Project name (default: directory name)
        name: Option<String>,
    },

    /// Show the sprint board (default command)
    Board,

    /// Sprint summary: progress, column totals, capacity, blockers
    Status,

    /// List tasks
    List {
        /// Only tasks with this status
        status: Option<String>,
        /// Only tasks in the current sprint
        #[arg(long)]
        active: bool,
    },

    /// Show full details for a single task
    Show { id: String },

    /// List technical debt items
    Debt,

    /// Add a task to the current sprint backlog
    Add {
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// Move a task to another column
    Move { id: String, status: String },

    /// Edit one task field (title, type, priority, points, owner, branch, sprint, notes)
    Edit {
        id: String,
        field: String,
        #[arg(required = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Write the markdown board file
    Generate,

    /// Create or update GitHub issues from task status
    Push {
        /// Push every task, not just the current sprint
        #[arg(long)]
        all: bool,
        /// Only push tasks with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Mark tasks done whose GitHub issues were closed
    Pull,

    /// Link a task to an existing GitHub issue
    Link {
        id: String,
        /// Issue number, e.g. 42 or #42
        issue: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let json = cli.json;

    let result = match cli.command.unwrap_or(Commands::Board) {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), json),
        Commands::Board => cmd::board::board(&root, json),
        Commands::Status => cmd::board::status(&root, json),
        Commands::List { status, active } => {
            cmd::task::list(&root, status.as_deref(), active, json)
        }
        Commands::Show { id } => cmd::task::show(&root, &id, json),
        Commands::Debt => cmd::debt::run(&root, json),
        Commands::Add { title } => cmd::task::add(&root, &title.join(" "), json),
        Commands::Move { id, status } => cmd::task::move_to(&root, &id, &status, json),
        Commands::Edit { id, field, value } => {
            cmd::task::edit(&root, &id, &field, &value.join(" "), json)
        }
        Commands::Generate => cmd::board::generate(&root, json),
        Commands::Push { all, status } => cmd::sync::push(&root, all, status, json),
        Commands::Pull => cmd::sync::pull(&root, json),
        Commands::Link { id, issue } => cmd::sync::link(&root, &id, &issue, json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
