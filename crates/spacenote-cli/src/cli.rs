use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Output format for CLI commands
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Which space template a command targets
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateTarget {
    /// Template for the note detail view
    Detail,
    /// Template for each item of the note list
    List,
}

#[derive(Parser)]
#[command(name = "spacenote")]
#[command(version, about = "SpaceNote - notes in configurable spaces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend API base URL (defaults to http://localhost:3000/api)
    #[arg(long, global = true, env = "SPACENOTE_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Log in and store the session
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Change the password (logs out afterwards)
    Passwd,

    /// Open a client route, e.g. `/notes/tasks?page=2`
    Open {
        /// Route path
        path: String,
    },

    /// Space management
    Space {
        #[command(subcommand)]
        command: SpaceCommands,
    },

    /// Saved filter management
    Filter {
        #[command(subcommand)]
        command: FilterCommands,
    },

    /// Note detail/list templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// Note comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// User management (admin)
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "SPACENOTE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum SpaceCommands {
    /// List spaces
    List {
        /// Refetch instead of using the cached list
        #[arg(long)]
        refresh: bool,
    },

    /// Show a space and its field schema
    Show {
        id: String,
        /// Fetch this space from the server instead of the cached list
        #[arg(long)]
        fresh: bool,
    },

    /// Create a space
    Create {
        /// URL-safe id (lowercase letters, digits, hyphens)
        id: String,
        /// Display name
        name: String,
    },

    /// Set the default list columns (comma separated, empty to reset)
    ListFields { id: String, fields: String },

    /// Set fields hidden from the create form (comma separated)
    HiddenFields { id: String, fields: String },

    /// Export a space as JSON
    Export {
        id: String,
        /// Include notes and comments
        #[arg(long)]
        include_content: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import a space from an export file
    Import {
        /// Path to the export JSON
        file: String,
    },
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// List a space's saved filters
    List { space: String },

    /// Create a saved filter
    Create {
        space: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Condition as field:operator:value (repeatable)
        #[arg(short, long = "condition")]
        conditions: Vec<String>,
        /// Sort fields, comma separated, `-` prefix for descending
        #[arg(long, default_value = "")]
        sort: String,
        /// Column override, comma separated
        #[arg(long, default_value = "")]
        list_fields: String,
    },

    /// Delete a saved filter
    Delete { space: String, id: String },

    /// Show the operators valid for each field of a space
    Operators { space: String },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Print a space's template
    Show {
        space: String,
        #[arg(long, value_enum, default_value = "detail")]
        kind: TemplateTarget,
    },

    /// Validate and save a template
    Set {
        space: String,
        #[arg(long, value_enum, default_value = "detail")]
        kind: TemplateTarget,
        /// Template file
        #[arg(short, long, conflicts_with = "template")]
        file: Option<String>,
        /// Template text
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Remove a template
    Clear {
        space: String,
        #[arg(long, value_enum, default_value = "detail")]
        kind: TemplateTarget,
    },

    /// Check a template file without saving it
    Validate {
        /// Template file
        file: String,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// List notes of a space
    List {
        space: String,
        /// Saved filter id
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show a note
    Show { space: String, id: i64 },

    /// Create a note
    Create {
        space: String,
        /// Field value as name=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Edit a note
    Edit {
        space: String,
        id: i64,
        /// Field value as name=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Show the form a space generates
    Form {
        space: String,
        /// Show the edit form of this note instead of the create form
        #[arg(long)]
        note: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// List comments of a note
    List { space: String, note: i64 },

    /// Add a comment to a note
    Add {
        space: String,
        note: i64,
        content: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List,

    /// Create a user (password is prompted)
    Create { username: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Persist the API URL in the config file
    SetApiUrl { url: String },
}
