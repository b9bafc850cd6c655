//! These structs provide the CLI interface for the finsheet CLI.

use crate::model::{Amount, DataKind, Household};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finsheet: Turns a household budget spreadsheet into monthly averages, a savings projection and
/// a written analysis.
///
/// The sheet is expected to follow a simple template: column B holds an "Income" marker and an
/// "Expense" marker with line items below each, and the row above the Income marker holds the
/// period headers (months) from column C onwards. Rows whose label contains "Total" are treated
/// as subtotals and ignored.
///
/// The written analysis is produced by Google Gemini. You need an API key for it, see `init`.
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
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/finsheet; pass --finsheet-home to put it somewhere else.
    ///
    /// Pass --api-key with the path to a text file holding your Gemini API key and it will be
    /// copied into the secrets directory. Alternatively set GEMINI_API_KEY when running `advise`.
    Init(InitArgs),
    /// Parse a budget sheet and print its monthly averages, totals and largest expenses.
    Analyze(AnalyzeArgs),
    /// Project a savings balance forward with monthly compounding.
    Project(ProjectArgs),
    /// Analyze a budget sheet and ask Gemini for a written analysis.
    Advise(AdviseArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finsheet configuration and the audit log are held. Defaults to
    /// ~/finsheet
    #[arg(long, env = "FINSHEET_HOME", default_value_t = default_finsheet_home())]
    finsheet_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finsheet_home: PathBuf) -> Self {
        Self {
            log_level,
            finsheet_home: finsheet_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finsheet_home(&self) -> &DisplayPath {
        &self.finsheet_home
    }
}

/// (Not shown): Args for the `finsheet init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// A text file holding your Gemini API key. It will be copied to the secrets directory.
    #[arg(long)]
    api_key: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(api_key: Option<PathBuf>) -> Self {
        Self { api_key }
    }

    pub fn api_key(&self) -> Option<&Path> {
        self.api_key.as_deref()
    }
}

/// Which file to read and how.
#[derive(Debug, Parser, Clone)]
pub struct SheetArgs {
    /// The budget spreadsheet: .xlsx, .xlsm, .xlsb, .xls, .ods or .csv
    file: PathBuf,

    /// The worksheet to read. Defaults to the first one in the workbook.
    #[arg(long)]
    sheet: Option<String>,

    /// How many of the largest expenses to list. Defaults to `top_n` in config.json.
    #[arg(long)]
    top: Option<usize>,
}

impl SheetArgs {
    pub fn new(file: impl Into<PathBuf>, sheet: Option<String>, top: Option<usize>) -> Self {
        Self {
            file: file.into(),
            sheet,
            top,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    pub fn top(&self) -> Option<usize> {
        self.top
    }
}

/// (Not shown): Args for the `finsheet analyze` command.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    #[clap(flatten)]
    sheet: SheetArgs,

    /// Also output every extracted line item.
    #[arg(long)]
    records: bool,
}

impl AnalyzeArgs {
    pub fn new(sheet: SheetArgs, records: bool) -> Self {
        Self { sheet, records }
    }

    pub fn sheet(&self) -> &SheetArgs {
        &self.sheet
    }

    pub fn records(&self) -> bool {
        self.records
    }
}

/// Horizon and rate of a projection.
#[derive(Debug, Parser, Clone)]
pub struct GrowthArgs {
    /// Annual interest rate in percent, e.g. 5 or 3.5
    #[arg(long, default_value = "5")]
    rate: Decimal,

    /// Number of years to project, 1 to 100
    #[arg(long, default_value_t = 10)]
    years: u32,
}

impl GrowthArgs {
    pub fn new(rate: Decimal, years: u32) -> Self {
        Self { rate, years }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn years(&self) -> u32 {
        self.years
    }
}

/// (Not shown): Args for the `finsheet project` command.
#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    /// The balance at the start
    #[arg(long, default_value = "0")]
    start: Amount,

    /// The amount added every month. May be negative for a withdrawal. Defaults to the true
    /// savings of --file when given, otherwise 0.
    #[arg(long, allow_negative_numbers = true)]
    monthly: Option<Amount>,

    #[clap(flatten)]
    growth: GrowthArgs,

    /// A budget spreadsheet whose true savings become the monthly contribution.
    #[arg(long)]
    file: Option<PathBuf>,

    /// The worksheet of --file to read.
    #[arg(long, requires = "file")]
    sheet: Option<String>,
}

impl ProjectArgs {
    pub fn new(
        start: Amount,
        monthly: Option<Amount>,
        growth: GrowthArgs,
        file: Option<PathBuf>,
        sheet: Option<String>,
    ) -> Self {
        Self {
            start,
            monthly,
            growth,
            file,
            sheet,
        }
    }

    pub fn start(&self) -> Amount {
        self.start
    }

    pub fn monthly(&self) -> Option<Amount> {
        self.monthly
    }

    pub fn growth(&self) -> &GrowthArgs {
        &self.growth
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }
}

/// (Not shown): Args for the `finsheet advise` command.
#[derive(Debug, Parser, Clone)]
pub struct AdviseArgs {
    #[clap(flatten)]
    sheet: SheetArgs,

    /// Your age
    #[arg(long, value_parser = clap::value_parser!(u8).range(15..=100))]
    age: u8,

    /// Who lives in the household
    #[arg(long, value_enum, default_value_t = Household::Single)]
    household: Household,

    /// Number of children in the household
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=10))]
    children: u8,

    /// What you are saving towards, in your own words
    #[arg(long)]
    goal: String,

    /// Homes plus investments minus debts
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    net_worth: Amount,

    /// Whether the sheet is a budget plan or realised figures
    #[arg(long, value_enum, default_value_t = DataKind::Plan)]
    data_kind: DataKind,

    #[clap(flatten)]
    growth: GrowthArgs,
}

impl AdviseArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sheet: SheetArgs,
        age: u8,
        household: Household,
        children: u8,
        goal: impl Into<String>,
        net_worth: Amount,
        data_kind: DataKind,
        growth: GrowthArgs,
    ) -> Self {
        Self {
            sheet,
            age,
            household,
            children,
            goal: goal.into(),
            net_worth,
            data_kind,
            growth,
        }
    }

    pub fn sheet(&self) -> &SheetArgs {
        &self.sheet
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn household(&self) -> Household {
        self.household
    }

    pub fn children(&self) -> u8 {
        self.children
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn net_worth(&self) -> Amount {
        self.net_worth
    }

    pub fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    pub fn growth(&self) -> &GrowthArgs {
        &self.growth
    }
}

fn default_finsheet_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finsheet"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finsheet-home or FINSHEET_HOME instead of relying on the \
                default finsheet home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("finsheet")
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("finsheet").chain(args.iter().copied()))
    }

    #[test]
    fn test_analyze() {
        let args = parse(&["analyze", "budget.xlsx", "--sheet", "2024", "--top", "3"]).unwrap();
        let Command::Analyze(analyze) = args.command() else {
            panic!("expected analyze");
        };
        assert_eq!(analyze.sheet().file(), Path::new("budget.xlsx"));
        assert_eq!(analyze.sheet().sheet(), Some("2024"));
        assert_eq!(analyze.sheet().top(), Some(3));
        assert!(!analyze.records());
    }

    #[test]
    fn test_project_defaults_and_negative_monthly() {
        let args = parse(&["project", "--monthly", "-100", "--start", "1 000"]).unwrap();
        let Command::Project(project) = args.command() else {
            panic!("expected project");
        };
        assert_eq!(project.monthly(), Some(Amount::from_str("-100").unwrap()));
        assert_eq!(project.start(), Amount::from_str("1000").unwrap());
        assert_eq!(project.growth().rate(), Decimal::from(5));
        assert_eq!(project.growth().years(), 10);
        assert!(project.file().is_none());
    }

    #[test]
    fn test_project_sheet_requires_file() {
        assert!(parse(&["project", "--sheet", "Budget"]).is_err());
    }

    #[test]
    fn test_advise() {
        let args = parse(&[
            "advise",
            "b.csv",
            "--age",
            "37",
            "--household",
            "single-parent",
            "--children",
            "2",
            "--goal",
            "Buy a cottage",
            "--net-worth",
            "-5000",
            "--data-kind",
            "actual",
        ])
        .unwrap();
        let Command::Advise(advise) = args.command() else {
            panic!("expected advise");
        };
        assert_eq!(advise.age(), 37);
        assert_eq!(advise.household(), Household::SingleParent);
        assert_eq!(advise.children(), 2);
        assert_eq!(advise.net_worth(), Amount::from_str("-5000").unwrap());
        assert_eq!(advise.data_kind(), DataKind::Actual);
    }

    #[test]
    fn test_advise_rejects_out_of_range_age() {
        assert!(parse(&["advise", "b.csv", "--age", "12", "--goal", "x"]).is_err());
        assert!(parse(&["advise", "b.csv", "--goal", "x"]).is_err());
    }
}
