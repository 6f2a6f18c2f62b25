use clap::builder::BoolishValueParser;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tag_monger::store::Provider;
use tag_monger::tag::WeekNumbering;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "tag-monger",
    bin_name = "tag-monger",
    version = get_version(),
    about = "Move expired date-stamped tag files under an archive directory",
    long_about = None
)]
#[command(group(ArgGroup::new("provider").args(["aws", "gcs", "local"]).multiple(false)))]
pub struct Cli {
    /// Use AWS S3
    #[arg(short, long, help_heading = "Provider")]
    pub aws: bool,

    /// Use Google Cloud Storage
    #[arg(short, long, help_heading = "Provider")]
    pub gcs: bool,

    /// Use a local directory as the bucket
    #[arg(short, long, help_heading = "Provider")]
    pub local: bool,

    /// Bucket name (a directory path with --local)
    #[arg(short, long, env = "TAG_MONGER_BUCKET")]
    pub bucket: Option<String>,

    /// Keys handed over per listing page (the backend picks its own request size)
    #[arg(short = 'p', long = "pagesize", env = "TAG_MONGER_PAGESIZE")]
    pub page_size: Option<usize>,

    /// Maximum number of objects to list (0 for no limit)
    #[arg(short, long, env = "TAG_MONGER_MAX")]
    pub max: Option<usize>,

    /// Expire tags older than this many days
    #[arg(short, long, env = "TAG_MONGER_DAYS")]
    pub days: Option<u32>,

    /// Report what would move without changing anything
    #[arg(short, long, env = "TAG_MONGER_NOOP", value_parser = BoolishValueParser::new())]
    pub noop: bool,

    /// List every classified key
    #[arg(short, long, env = "TAG_MONGER_VERBOSE", value_parser = BoolishValueParser::new())]
    pub verbose: bool,

    /// Time zone used to decide what "today" is
    #[arg(long = "tz", env = "TAG_MONGER_TZ", value_name = "ZONE")]
    pub time_zone: Option<String>,

    /// Directory expired tags are moved into
    #[arg(long, env = "TAG_MONGER_ARCHIVE_DIR", value_name = "NAME")]
    pub archive_dir: Option<String>,

    /// Regular expression selecting tag files
    #[arg(long, env = "TAG_MONGER_PATTERN", value_name = "REGEX")]
    pub pattern: Option<String>,

    /// How weekly tags are numbered: iso or calendar
    #[arg(long, env = "TAG_MONGER_WEEK_NUMBERING", value_name = "MODE")]
    pub week_numbering: Option<WeekNumbering>,

    /// Config file (defaults to config.json in the user config directory)
    #[arg(short, long, env = "TAG_MONGER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The provider picked on the command line, if any.
    pub fn provider(&self) -> Option<Provider> {
        if self.aws {
            Some(Provider::Aws)
        } else if self.gcs {
            Some(Provider::Gcs)
        } else if self.local {
            Some(Provider::Local)
        } else {
            None
        }
    }
}
