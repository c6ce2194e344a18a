use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sprintboard")]
#[command(about = "Sprint board for project tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the board data file (or set SPRINTBOARD_FILE)
    #[arg(long, short, value_name = "FILE", env = "SPRINTBOARD_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Config file overriding the platform default
    #[arg(long, value_name = "PATH", env = "SPRINTBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Organization the commands act in
    #[arg(long, env = "SPRINTBOARD_ORG", default_value = "default", global = true)]
    pub org: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project operations
    Project(ProjectCommand),
    /// Sprint operations
    Sprint(SprintCommand),
    /// Issue operations
    Issue(IssueCommand),
    /// Board views
    Board(BoardCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Project commands
#[derive(Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project (organization admins only)
    Create {
        /// 2-10 letters or digits, e.g. WEB
        #[arg(long)]
        key: String,
        #[arg(long)]
        name: String,
    },
    /// List the organization's projects
    List,
}

// Sprint commands
#[derive(Args)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a PLANNED sprint
    Create {
        /// Project id or key
        #[arg(long)]
        project: String,
        /// Defaults to KEY-n
        #[arg(long)]
        name: Option<String>,
        /// YYYY-MM-DD or RFC 3339; defaults to now
        #[arg(long)]
        start: Option<String>,
        /// Defaults to start plus the configured sprint length
        #[arg(long)]
        end: Option<String>,
    },
    /// List a project's sprints
    List {
        #[arg(long)]
        project: String,
    },
    /// Show which lifecycle actions a sprint offers
    Status {
        #[arg(long)]
        id: String,
        /// Evaluate at this instant instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Move a PLANNED sprint to ACTIVE
    Start {
        #[arg(long)]
        id: String,
    },
    /// Move an ACTIVE sprint to COMPLETED
    End {
        #[arg(long)]
        id: String,
    },
}

// Issue commands
#[derive(Args)]
pub struct IssueCommand {
    #[command(subcommand)]
    pub action: IssueAction,
}

#[derive(Subcommand)]
pub enum IssueAction {
    /// Create an issue in a sprint
    Create(IssueCreateArgs),
    /// List a sprint's issues
    List {
        #[arg(long)]
        sprint: String,
    },
    /// Move an issue to another status column
    Move {
        #[arg(long)]
        id: String,
        /// TODO, IN_PROGRESS, IN_REVIEW or DONE
        #[arg(long)]
        to: String,
    },
}

#[derive(Args)]
pub struct IssueCreateArgs {
    #[arg(long)]
    pub sprint: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// LOW, MEDIUM, HIGH or URGENT
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub reporter: Option<String>,
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Print the column layout of a sprint
    Show {
        #[arg(long)]
        project: String,
        /// Defaults to the active sprint, else the first one
        #[arg(long)]
        sprint: Option<String>,
    },
}
