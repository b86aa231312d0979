use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "catat")]
#[command(about = "Free-text expense ledger with monthly summaries", long_about = None)]
pub struct Cli {
    /// Override catat home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "CATAT_HOME")]
    pub home: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record an expense written as "<category> <amount> <description>".
    Add(AddArgs),

    /// Today's expenses for one user.
    Today(ViewArgs),
    /// This month's expenses for one user.
    Month(ViewArgs),
    /// Today's and this month's expenses together.
    #[command(alias = "ringkasan")]
    Summary(ViewArgs),

    /// Print the stored monthly summary table.
    Sheet,
    /// Print ledger rows.
    Ledger(LedgerArgs),

    /// Set the user recorded when --user is omitted.
    User { id: String },

    Start(StartArgs),
    /// How to write expense messages.
    Guide,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// User identifier. Defaults to the configured default user.
    #[arg(long, env = "CATAT_USER")]
    pub user: Option<String>,

    /// Treat this moment as "now" (RFC3339 or YYYY-MM-DDTHH:MM:SS local time).
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// The message, e.g. `makan 25000 nasi goreng`. May be one quoted argument or several.
    /// Words starting with `-` are read as flags, never as part of the message.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LedgerArgs {
    /// Only rows whose date starts with this YYYY-MM.
    #[arg(long)]
    pub month: Option<String>,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(long)]
    pub name: Option<String>,
}
