use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::model::{IssueKind, Viewport};

#[derive(Parser, Debug)]
#[command(
    name = "slidedeck",
    version,
    about = "Build and visually check a static slide presentation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Build(BuildArgs),
    Check(CheckArgs),
    Review(ReviewArgs),
    Capture(CaptureArgs),
    CaptureSlide(CaptureSlideArgs),
    Measure(MeasureArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    #[arg(long)]
    pub data_path: Option<PathBuf>,

    #[arg(long)]
    pub slides_dir: Option<PathBuf>,

    #[arg(long)]
    pub header_path: Option<PathBuf>,

    #[arg(long)]
    pub footer_path: Option<PathBuf>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub service_worker_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub skip_service_worker: bool,

    #[arg(long, default_value_t = false)]
    pub allow_unresolved: bool,

    #[arg(long, default_value = "html")]
    pub fragment_extension: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum BrowserKind {
    Chromium,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CheckKind {
    BrokenImage,
    NotVisible,
    Overflow,
    FontMismatch,
    IconMissing,
    CardHeight,
    Diagram,
    ConsoleError,
}

impl CheckKind {
    pub fn issue_kind(self) -> IssueKind {
        match self {
            Self::BrokenImage => IssueKind::BrokenImage,
            Self::NotVisible => IssueKind::NotVisible,
            Self::Overflow => IssueKind::Overflow,
            Self::FontMismatch => IssueKind::FontMismatch,
            Self::IconMissing => IssueKind::IconMissing,
            Self::CardHeight => IssueKind::CardHeightMismatch,
            Self::Diagram => IssueKind::DiagramLayout,
            Self::ConsoleError => IssueKind::ConsoleError,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[arg(long, env = "SLIDES_URL", default_value = "http://localhost:8080")]
    pub url: String,

    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    #[arg(long, value_enum, default_value_t = BrowserKind::Chromium)]
    pub browser: BrowserKind,

    #[arg(long, default_value = "1920x1080")]
    pub viewport: Viewport,

    #[arg(
        long,
        env = "HEADLESS",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub headless: Option<bool>,

    #[arg(long, default_value_t = 10_000)]
    pub ready_timeout_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[arg(long = "check", value_enum)]
    pub checks: Vec<CheckKind>,

    #[arg(long)]
    pub settle_ms: Option<u64>,

    #[arg(long, default_value_t = 2.0)]
    pub tolerance_px: f64,

    #[arg(long)]
    pub overflow_cap: Option<usize>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long)]
    pub json_report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,

    #[arg(long, env = "SLIDE_DELAY_MS", default_value_t = 2000)]
    pub slide_delay_ms: u64,

    #[arg(
        long,
        env = "SCREENSHOTS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "true",
        default_missing_value = "true"
    )]
    pub screenshots: bool,

    #[arg(long, default_value = "review-slides-screenshots")]
    pub screenshots_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long, default_value = "assets/screenshots/presentation")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 600)]
    pub settle_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct CaptureSlideArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub slide: u32,

    pub out_path: Option<PathBuf>,

    #[arg(long, default_value = "assets/screenshots/presentation/interactive")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 600)]
    pub settle_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct MeasureArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    #[arg(long = "slide", required = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub slides: Vec<u32>,

    #[arg(long, default_value_t = 500)]
    pub settle_ms: u64,
}
