use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "carnet")]
#[command(about = "Manage your notes and tasks from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile name holding the API URL and stored session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override the backend API base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out, and inspect the stored session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List, create, edit, and delete notes
    Notes {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// List and create note categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// List, create, edit, and delete tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with email/password and store the session in the keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Sign in again even if the profile already has a session
        #[arg(long)]
        force: bool,
    },
    /// Login with the URL encoded in a QR login code
    Qr {
        /// Scanned QR code payload
        url: String,
        /// Sign in again even if the profile already has a session
        #[arg(long)]
        force: bool,
    },
    /// Show auth status for profile
    Status,
    /// Logout profile and clear stored session
    Logout,
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// List notes
    List {
        /// Case-insensitive text filter on title and content
        #[arg(short, long)]
        search: Option<String>,
        /// Only notes carrying every given category id
        #[arg(short, long = "category", value_name = "ID")]
        categories: Vec<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a note
    Show {
        /// Note ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(long)]
        title: String,
        /// Note content
        #[arg(long)]
        content: String,
        /// Category id to attach (repeatable)
        #[arg(short, long = "category", value_name = "ID")]
        categories: Vec<i64>,
    },
    /// Edit an existing note
    Edit {
        /// Note ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// Toggle a category on the note (repeatable)
        #[arg(long = "toggle-category", value_name = "ID")]
        toggle_categories: Vec<i64>,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Color as #RRGGBB (defaults to the first palette color)
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Case-insensitive text filter on the description
        #[arg(short, long)]
        search: Option<String>,
        /// Show completed tasks instead of open ones
        #[arg(long)]
        completed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a task with its subtasks
    Show {
        /// Task ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task
    #[command(alias = "new")]
    Add {
        /// Task description
        description: String,
        /// Link the task to a note
        #[arg(long, value_name = "ID")]
        note: Option<i64>,
        /// Subtask description (repeatable)
        #[arg(short, long = "subtask", value_name = "TEXT")]
        subtasks: Vec<String>,
    },
    /// Edit an existing task
    Edit {
        /// Task ID
        id: i64,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Link the task to a note
        #[arg(long, value_name = "ID", conflicts_with = "unlink_note")]
        note: Option<i64>,
        /// Remove the note link
        #[arg(long)]
        unlink_note: bool,
        /// Append a subtask (repeatable)
        #[arg(long = "add-subtask", value_name = "TEXT")]
        add_subtasks: Vec<String>,
        /// Remove the subtask at this 1-based position (repeatable)
        #[arg(long = "remove-subtask", value_name = "N")]
        remove_subtasks: Vec<usize>,
        /// Flip completion of the subtask at this 1-based position (repeatable)
        #[arg(long = "toggle-subtask", value_name = "N")]
        toggle_subtasks: Vec<usize>,
    },
    /// Flip a task between open and completed
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store the backend API base URL for a profile
    SetUrl {
        /// API base URL, e.g. https://api.example.com/api
        url: String,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved configuration
    Show,
}
