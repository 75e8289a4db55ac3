//! These structs provide the CLI interface for the billed CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// billed: A command-line client for expense reports.
///
/// The purpose of this program is to list the bills you have submitted to
/// your company's Billed instance, to inspect their receipts, and to submit
/// new bills, including uploading the receipt image (jpg, jpeg or png).
///
/// Run `billed init` first to point the tool at your Billed API and record
/// the email your bills are submitted as.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Decide what directory you
    /// want to store configuration in and pass it as --billed-home (default
    /// $HOME/billed), then provide the API base URL and your employee email.
    Init(InitArgs),
    /// List your submitted bills, most recent first.
    List,
    /// Submit a new bill, optionally uploading a receipt file.
    Submit(SubmitArgs),
    /// Print the receipt attachment URL of one bill.
    Receipt(ReceiptArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where billed configuration is held. Defaults to ~/billed
    #[arg(long, env = "BILLED_HOME", default_value_t = default_billed_home())]
    billed_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, billed_home: PathBuf) -> Self {
        Self {
            log_level,
            billed_home: billed_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn billed_home(&self) -> &DisplayPath {
        &self.billed_home
    }
}

/// Args for the `billed init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of your company's Billed API, e.g. http://localhost:5678/
    #[arg(long)]
    api_url: String,

    /// The employee email your bills are submitted as.
    #[arg(long)]
    email: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            email: email.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Args for the `billed submit` command.
#[derive(Debug, Parser, Clone)]
pub struct SubmitArgs {
    /// The expense category, e.g. "Transports".
    #[arg(long = "type")]
    expense_type: String,

    /// A short description of the expense.
    #[arg(long)]
    name: String,

    /// The expense date as YYYY-MM-DD.
    #[arg(long)]
    date: String,

    /// The amount in whole currency units.
    #[arg(long)]
    amount: String,

    /// The VAT amount, free-form.
    #[arg(long, default_value = "")]
    vat: String,

    /// The VAT percentage. Defaults to 20 when empty or not a number.
    #[arg(long, default_value = "")]
    pct: String,

    /// An optional comment.
    #[arg(long, default_value = "")]
    commentary: String,

    /// The path of the receipt image to upload (jpg, jpeg or png).
    #[arg(long)]
    receipt: Option<PathBuf>,
}

impl SubmitArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        expense_type: impl Into<String>,
        name: impl Into<String>,
        date: impl Into<String>,
        amount: impl Into<String>,
        vat: impl Into<String>,
        pct: impl Into<String>,
        commentary: impl Into<String>,
        receipt: Option<PathBuf>,
    ) -> Self {
        Self {
            expense_type: expense_type.into(),
            name: name.into(),
            date: date.into(),
            amount: amount.into(),
            vat: vat.into(),
            pct: pct.into(),
            commentary: commentary.into(),
            receipt,
        }
    }

    pub fn expense_type(&self) -> &str {
        &self.expense_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn vat(&self) -> &str {
        &self.vat
    }

    pub fn pct(&self) -> &str {
        &self.pct
    }

    pub fn commentary(&self) -> &str {
        &self.commentary
    }

    pub fn receipt(&self) -> Option<&Path> {
        self.receipt.as_deref()
    }
}

/// Args for the `billed receipt` command.
#[derive(Debug, Parser, Clone)]
pub struct ReceiptArgs {
    /// The id of the bill whose receipt to resolve.
    bill_id: String,
}

impl ReceiptArgs {
    pub fn new(bill_id: impl Into<String>) -> Self {
        Self {
            bill_id: bill_id.into(),
        }
    }

    pub fn bill_id(&self) -> &str {
        &self.bill_id
    }
}

fn default_billed_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("billed"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --billed-home or BILLED_HOME instead of relying on the default \
                billed home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("billed")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
