//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use booktrove_backup::{RecordType, UpdatePolicy};
use booktrove_search::{EngineId, SiteType};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "booktrove")]
#[command(about = "Catalogue your books, back them up, and look them up online", long_about = None)]
pub(crate) struct Cli {
    /// Catalogue database file (overrides settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Cover image directory (overrides settings.toml)
    #[arg(long, global = true)]
    pub covers_dir: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which record types an archive command covers.
#[derive(Args, Clone, Default)]
pub(crate) struct RecordTypeArgs {
    /// Record types (books,covers,preferences,styles); default all
    #[arg(short, long, value_delimiter = ',')]
    pub types: Option<Vec<RecordType>>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Manage books in the catalogue
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },

    /// Write a backup archive
    Export {
        /// Archive file to write
        path: PathBuf,

        /// Only books changed since the last full backup
        #[arg(short, long)]
        incremental: bool,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        types: RecordTypeArgs,
    },

    /// Restore a backup archive into the catalogue
    Import {
        /// Archive file to read
        path: PathBuf,

        /// What to do with books that already exist
        #[arg(short, long, value_enum, default_value = "skip")]
        policy: PolicyArg,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        types: RecordTypeArgs,
    },

    /// Show a backup archive's manifest without importing it
    Info {
        /// Archive file to inspect
        path: PathBuf,
    },

    /// Look a book up on the enabled search sites
    Search {
        /// ISBN-10 or ISBN-13
        #[arg(long, conflicts_with_all = ["title", "author"])]
        isbn: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Add the merged result to the catalogue (ISBN searches only)
        #[arg(long, requires = "isbn")]
        add: bool,

        /// Per-site time limit in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Configure which search sites are used, and in what order
    Sites {
        #[command(subcommand)]
        action: SitesAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum BooksAction {
    /// List books, optionally filtered or grouped by a booklist style
    List {
        /// Only books whose title, author or ISBN contains this text
        query: Option<String>,

        /// Group with this booklist style (name or uuid)
        #[arg(long)]
        style: Option<String>,
    },

    /// Add a book by hand
    Add {
        title: String,

        /// Author, as "Given Family" or "Family, Given" (repeatable)
        #[arg(short, long)]
        author: Vec<String>,

        #[arg(long)]
        isbn: Option<String>,

        #[arg(long)]
        publisher: Option<String>,

        /// Publication date (YYYY, YYYY-MM or YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show one book
    Show { id: i64 },

    /// Delete one book
    Delete {
        id: i64,

        /// Confirm the deletion (required)
        #[arg(long)]
        confirm: bool,
    },

    /// Catalogue statistics
    Stats,

    /// List booklist styles (built-in, stored, and from the styles folder)
    Styles,
}

#[derive(Subcommand)]
pub(crate) enum SitesAction {
    /// Show the sites for each purpose, in order
    List {
        #[arg(short = 't', long = "type")]
        site_type: Option<SiteType>,
    },

    /// Set the order, e.g. `sites order data isfdb,openlibrary`
    Order {
        site_type: SiteType,

        /// Sites first in line; the others keep their order after them
        #[arg(value_delimiter = ',')]
        sites: Vec<EngineId>,
    },

    Enable {
        site: EngineId,
        #[arg(short = 't', long = "type", default_value = "data")]
        site_type: SiteType,
    },

    Disable {
        site: EngineId,
        #[arg(short = 't', long = "type", default_value = "data")]
        site_type: SiteType,
    },

    /// Restore default order and flags
    Reset {
        #[arg(short = 't', long = "type")]
        site_type: Option<SiteType>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show resolved paths, settings and credential sources
    Show,

    /// Print the config directory path
    Path,

    /// Set a catalogue setting (db_path or covers_dir); omit the value to clear it
    Set { key: String, value: Option<PathBuf> },

    /// Store the Google Books API key in credentials.toml
    SetKey { key: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum PolicyArg {
    /// Only add new books
    Skip,
    /// Replace existing books
    Overwrite,
    /// Replace existing books that changed later in the archive
    Sync,
}

impl From<PolicyArg> for UpdatePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Skip => UpdatePolicy::Skip,
            PolicyArg::Overwrite => UpdatePolicy::Overwrite,
            PolicyArg::Sync => UpdatePolicy::Sync,
        }
    }
}
