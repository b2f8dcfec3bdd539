use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMetadata {
    pub project: ProjectInfo,
    pub metrics: ProjectMetrics,
    pub releases: ReleaseInfo,
    pub api: ApiInfo,
    pub author: AuthorInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub version: String,
    pub last_update: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub total_tests: u64,
    pub backend_tests: u64,
    pub frontend_tests: u64,
    pub backend_coverage: String,
    pub frontend_coverage: String,
    pub global_coverage: String,
    #[serde(rename = "lastADR")]
    pub last_adr: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub current: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    pub version: String,
    pub endpoints: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub master: String,
    pub school: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (width, height) = raw
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
        let width = width
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid viewport width {width:?}: {err}"))?;
        let height = height
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid viewport height {height:?}: {err}"))?;
        if width == 0 || height == 0 {
            return Err(format!("viewport must be non-empty, got {raw:?}"));
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    BrokenImage,
    NotVisible,
    Overflow,
    FontMismatch,
    IconMissing,
    CardHeightMismatch,
    DiagramLayout,
    ProbeFailed,
    ConsoleError,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BrokenImage => "broken_image",
            Self::NotVisible => "not_visible",
            Self::Overflow => "overflow",
            Self::FontMismatch => "font_mismatch",
            Self::IconMissing => "icon_missing",
            Self::CardHeightMismatch => "card_height_mismatch",
            Self::DiagramLayout => "diagram_layout",
            Self::ProbeFailed => "probe_failed",
            Self::ConsoleError => "console_error",
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            Self::BrokenImage => "image did not load or has zero natural size",
            Self::NotVisible => "slide section is not visible or nearly zero-sized (may be a transition in progress)",
            Self::Overflow => "content extends past the viewport; B above the viewport height is clipped at the bottom",
            Self::FontMismatch => "same kind of element on one slide rendered at different font sizes",
            Self::IconMissing => "within one grid/list some cards have an icon/badge and others do not",
            Self::CardHeightMismatch => "cards in the same grid render at different heights",
            Self::DiagramLayout => "diagram overflows the viewport, forces horizontal scroll or renders under 200px wide",
            Self::ProbeFailed => "the slide could not be activated, inspected or captured",
            Self::ConsoleError => "console error observed while the slide was active",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideIssue {
    pub slide_number: usize,
    pub slide_label: String,
    pub kind: IssueKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub title: String,
    pub url: String,
    pub viewport: Viewport,
    pub total_slides: usize,
    pub generated_at: String,
    pub issues: Vec<SlideIssue>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_by_slide(&self) -> BTreeMap<usize, Vec<&SlideIssue>> {
        let mut grouped: BTreeMap<usize, Vec<&SlideIssue>> = BTreeMap::new();
        for issue in &self.issues {
            grouped.entry(issue.slide_number).or_default().push(issue);
        }
        grouped
    }

    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    IssuesFound,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::IssuesFound => 1,
        }
    }
}

pub fn slide_label(slide_number: usize, total: usize) -> String {
    if slide_number == 0 {
        "Global".to_string()
    } else {
        format!("Slide {slide_number}/{total}")
    }
}

pub fn slide_file_name(slide_number: usize) -> String {
    format!("slide-{slide_number:02}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_parses_width_by_height() {
        let viewport: Viewport = "1280x720".parse().expect("viewport should parse");
        assert_eq!(viewport, Viewport::new(1280, 720));
        assert_eq!(viewport.to_string(), "1280x720");
    }

    #[test]
    fn viewport_rejects_malformed_and_empty_sizes() {
        assert!("1280".parse::<Viewport>().is_err());
        assert!("0x720".parse::<Viewport>().is_err());
        assert!("widexhigh".parse::<Viewport>().is_err());
    }

    #[test]
    fn slide_file_name_zero_pads_to_two_digits() {
        assert_eq!(slide_file_name(3), "slide-03.png");
        assert_eq!(slide_file_name(12), "slide-12.png");
        assert_eq!(slide_file_name(104), "slide-104.png");
    }

    #[test]
    fn issues_group_by_slide_in_ascending_order() {
        let issue = |slide_number, kind| SlideIssue {
            slide_number,
            slide_label: slide_label(slide_number, 4),
            kind,
            detail: String::new(),
        };
        let report = SweepReport {
            title: "t".to_string(),
            url: "http://localhost:8080".to_string(),
            viewport: Viewport::default(),
            total_slides: 4,
            generated_at: String::new(),
            issues: vec![
                issue(3, IssueKind::Overflow),
                issue(1, IssueKind::BrokenImage),
                issue(3, IssueKind::ConsoleError),
                issue(0, IssueKind::ConsoleError),
            ],
        };

        let grouped = report.issues_by_slide();
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(grouped[&3].len(), 2);
        assert_eq!(report.counts_by_kind()[&IssueKind::ConsoleError], 2);
        assert_eq!(grouped[&0][0].slide_label, "Global");
    }
}
