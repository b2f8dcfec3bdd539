use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::{CheckArgs, CheckKind, ReviewArgs, SessionArgs, SweepArgs};
use crate::model::{
    CommandStatus, IssueKind, SlideIssue, SweepReport, Viewport, slide_file_name, slide_label,
};
use crate::presentation::{
    CardGridSpec, ElementProbe, IconGridSpec, ProbeRequest, RevealPage, SlidePage, SlideSnapshot,
};
use crate::util::{ensure_directory, now_utc_string, truncate_chars, write_json_pretty, write_text};
use crate::webdriver::SessionConfig;

const CONSOLE_DETAIL_MAX_CHARS: usize = 200;
const MIN_VISIBLE_EDGE_PX: f64 = 10.0;
const MIN_DIAGRAM_WIDTH_PX: f64 = 200.0;
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(15);
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

const CHECK_DEFAULTS: &[CheckKind] = &[
    CheckKind::BrokenImage,
    CheckKind::NotVisible,
    CheckKind::Overflow,
    CheckKind::ConsoleError,
];
const REVIEW_DEFAULTS: &[CheckKind] = &[
    CheckKind::BrokenImage,
    CheckKind::NotVisible,
    CheckKind::Overflow,
    CheckKind::FontMismatch,
    CheckKind::IconMissing,
    CheckKind::ConsoleError,
];

mod catalog;
mod checks;
mod engine;
mod report;
mod run;


pub use catalog::SelectorCatalog;
pub use checks::{BrokenImageCheck, CheckContext, SlideCheck, checks_for};
pub use engine::{SweepConfig, SweepEngine, SweepOutcome, activate_slide, wait_until_ready};
pub use report::{build_report, print_report, render_text_report, write_reports};
pub use run::{run_check, run_review, session_config};
