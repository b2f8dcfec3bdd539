use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::BuildArgs;
use crate::model::{CommandStatus, ProjectMetadata};
use crate::util::{iso_millis_string, read_text, sha256_hex, write_text};

const CONTENT_HASH_LEN: usize = 8;
const FRAGMENT_SEPARATOR: &str = "\n\n";

mod compose;
mod placeholders;
mod run;
mod service_worker;

pub use run::run;

use compose::*;
use placeholders::*;
use service_worker::*;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    pub data_path: PathBuf,
    pub slides_dir: PathBuf,
    pub header_path: PathBuf,
    pub footer_path: PathBuf,
    pub output_path: PathBuf,
    pub service_worker_path: Option<PathBuf>,
    pub allow_unresolved: bool,
    pub fragment_extension: String,
}

impl BuildConfig {
    pub fn from_args(args: &BuildArgs) -> Self {
        let root = args.root.clone();
        let resolve = |value: &Option<PathBuf>, default: &str| {
            value.clone().unwrap_or_else(|| root.join(default))
        };

        Self {
            data_path: resolve(&args.data_path, "config/data.json"),
            slides_dir: resolve(&args.slides_dir, "slides"),
            header_path: resolve(&args.header_path, "templates/header.html"),
            footer_path: resolve(&args.footer_path, "templates/footer.html"),
            output_path: resolve(&args.output_path, "index.html"),
            service_worker_path: if args.skip_service_worker {
                None
            } else {
                Some(resolve(&args.service_worker_path, "sw.js"))
            },
            allow_unresolved: args.allow_unresolved,
            fragment_extension: args.fragment_extension.trim_start_matches('.').to_string(),
            root,
        }
    }
}
