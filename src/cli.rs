//! CLI surface. `clap` derive with a top-level global flag plus one
//! variant per verb. Argument parsing and `--help` text are kept
//! outside the testable core.

use clap::{Parser, Subcommand};

use crate::models::FeedbackRating;

#[derive(Parser)]
#[command(name = "daylit", about = "Personal day-scheduler")]
pub struct Cli {
    /// Path to the embedded database file, or a remote connection string
    #[arg(long, global = true, env = "DAYLIT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the schema at the resolved config location
    Init {
        #[arg(long)]
        force: bool,
        #[arg(long)]
        source: Option<String>,
    },

    /// Apply any pending schema migrations
    Migrate,

    /// Run consistency checks (schema version, orphaned rows, corrupt JSON)
    Doctor,

    /// Launch the interactive terminal UI (external binary)
    Tui,

    /// Generate or re-generate today's (or a given date's) plan
    Plan {
        /// `YYYY-MM-DD` or `today`
        date: String,
        #[arg(long)]
        new_revision: bool,
    },

    /// Show the current minute's status against today's plan
    Now,

    /// Attach feedback to the latest eligible completed slot
    Feedback {
        #[arg(long, value_enum)]
        rating: FeedbackRatingArg,
        #[arg(long)]
        note: Option<String>,
    },

    /// Show the plan for a given date
    Day { date: String },

    /// Internal diagnostic subcommands
    Debug {
        #[command(subcommand)]
        command: DebugCommand,
    },

    /// Run the validator over current tasks and the latest plan
    Validate,

    /// Backup management
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },

    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Plan lifecycle operations beyond generation
    Plans {
        #[command(subcommand)]
        command: PlansCommand,
    },

    /// Restore a soft-deleted task or plan
    Restore {
        #[command(subcommand)]
        command: RestoreCommand,
    },

    /// Habit tracking
    Habit {
        #[command(subcommand)]
        command: HabitCommand,
    },

    /// Once-today entries
    Ot {
        #[command(subcommand)]
        command: OtCommand,
    },

    /// Standalone alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommand,
    },

    /// OS keyring management for the remote connection string
    Keyring {
        #[command(subcommand)]
        command: KeyringCommand,
    },

    /// View or edit settings
    Settings {
        #[arg(long)]
        list: bool,
        #[arg(long)]
        day_start: Option<String>,
        #[arg(long)]
        day_end: Option<String>,
        #[arg(long)]
        default_block_min: Option<u32>,
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long)]
        notifications_enabled: Option<bool>,
        #[arg(long)]
        notify_block_start: Option<bool>,
        #[arg(long)]
        notify_block_end: Option<bool>,
        #[arg(long)]
        block_start_offset_min: Option<u32>,
        #[arg(long)]
        block_end_offset_min: Option<u32>,
        #[arg(long)]
        notification_grace_period_min: Option<u32>,
    },

    /// Run one notification tick (hidden: invoked by an external scheduler)
    #[command(hide = true)]
    Notify {
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum FeedbackRatingArg {
    OnTrack,
    TooMuch,
    Unnecessary,
}

impl From<FeedbackRatingArg> for FeedbackRating {
    fn from(value: FeedbackRatingArg) -> Self {
        match value {
            FeedbackRatingArg::OnTrack => FeedbackRating::OnTrack,
            FeedbackRatingArg::TooMuch => FeedbackRating::TooMuch,
            FeedbackRatingArg::Unnecessary => FeedbackRating::Unnecessary,
        }
    }
}

#[derive(Subcommand)]
pub enum DebugCommand {
    /// Print the resolved config and backend
    Config,
    /// Dump the raw schema_version row
    SchemaVersion,
}

#[derive(Subcommand)]
pub enum BackupCommand {
    Create,
    List,
    Restore { file: String },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    Add {
        name: String,
        #[arg(long)]
        appointment: bool,
        #[arg(long)]
        fixed_start: Option<String>,
        #[arg(long)]
        fixed_end: Option<String>,
        #[arg(long)]
        earliest_start: Option<String>,
        #[arg(long)]
        latest_end: Option<String>,
        #[arg(long)]
        duration_min: u32,
        #[arg(long, default_value = "daily")]
        recurrence: String,
        #[arg(long, default_value_t = 3)]
        priority: u8,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        duration_min: Option<u32>,
        #[arg(long)]
        priority: Option<u8>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete { id: String },
    List {
        #[arg(long)]
        include_deleted: bool,
    },
}

#[derive(Subcommand)]
pub enum PlansCommand {
    Delete { date: String },
}

#[derive(Subcommand)]
pub enum RestoreCommand {
    Task { id: String },
    Plan { date: String },
}

#[derive(Subcommand)]
pub enum HabitCommand {
    Add { name: String },
    Archive { id: String },
    Delete { id: String },
    List,
    Check { id: String, day: String },
}

#[derive(Subcommand)]
pub enum OtCommand {
    Set { day: String, note: String },
    Get { day: String },
}

#[derive(Subcommand)]
pub enum AlertCommand {
    Add {
        message: String,
        time: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        recurrence: Option<String>,
    },
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum KeyringCommand {
    Set { connection_string: String },
    Get,
    Delete,
    Status,
}
