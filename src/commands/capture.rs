use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use crate::cli::{CaptureArgs, CaptureSlideArgs};
use crate::model::{CommandStatus, IssueKind, SlideIssue, slide_file_name};
use crate::presentation::{RevealPage, SlidePage};
use crate::util::write_text;

use super::sweep::{
    BrokenImageCheck, SweepConfig, SweepEngine, activate_slide, session_config, wait_until_ready,
};

const BROKEN_IMAGES_FILE: &str = "broken-images.txt";

pub fn run(args: CaptureArgs) -> Result<CommandStatus> {
    let config = SweepConfig {
        viewport: args.session.viewport,
        settle_delay: Duration::from_millis(args.settle_ms),
        ready_timeout: Duration::from_millis(args.session.ready_timeout_ms),
        capture_console: false,
        screenshots_dir: Some(args.out_dir.clone()),
        ..SweepConfig::default()
    };

    let mut page = RevealPage::open(&session_config(&args.session, true), &args.session.url)?;
    let status = capture_deck(&mut page, config, &args.out_dir);
    if let Err(err) = page.close() {
        warn!(error = %err, "failed to close browser session");
    }
    status
}

pub(crate) fn capture_deck<P: SlidePage + ?Sized>(
    page: &mut P,
    config: SweepConfig,
    out_dir: &Path,
) -> Result<CommandStatus> {
    let broken_list = out_dir.join(BROKEN_IMAGES_FILE);
    remove_stale(&broken_list)?;

    let engine = SweepEngine::new(config).with_check(Box::new(BrokenImageCheck));
    let outcome = engine.run(page)?;

    let failed: Vec<&SlideIssue> = outcome
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::ProbeFailed)
        .collect();
    for issue in &failed {
        error!(slide = %issue.slide_label, detail = %issue.detail, "slide capture failed");
    }

    let lines = broken_image_lines(&outcome.issues);
    if !lines.is_empty() {
        write_text(&broken_list, &format!("{}\n", lines.join("\n")))?;
        warn!(
            slides = lines.len(),
            path = %broken_list.display(),
            "broken images listed"
        );
    }

    info!(
        slides = outcome.total_slides,
        screenshots = outcome.screenshots.len(),
        failed = failed.len(),
        dir = %out_dir.display(),
        "captured presentation"
    );
    Ok(if failed.is_empty() {
        CommandStatus::Success
    } else {
        CommandStatus::IssuesFound
    })
}

pub fn run_single(args: CaptureSlideArgs) -> Result<CommandStatus> {
    let slide_number = args.slide as usize;
    let out_path = args
        .out_path
        .clone()
        .unwrap_or_else(|| args.out_dir.join(slide_file_name(slide_number)));

    let mut page = RevealPage::open(&session_config(&args.session, true), &args.session.url)?;
    let captured = capture_one(
        &mut page,
        slide_number - 1,
        Duration::from_millis(args.settle_ms),
        Duration::from_millis(args.session.ready_timeout_ms),
        &out_path,
    );
    if let Err(err) = page.close() {
        warn!(error = %err, "failed to close browser session");
    }
    captured?;

    let mut output = io::stdout().lock();
    writeln!(output, "{}", out_path.display())?;
    Ok(CommandStatus::Success)
}

pub(crate) fn capture_one<P: SlidePage + ?Sized>(
    page: &mut P,
    index: usize,
    settle: Duration,
    ready_timeout: Duration,
    path: &Path,
) -> Result<()> {
    wait_until_ready(page, ready_timeout, Duration::from_millis(100))?;
    let total = page.slide_count()?;
    if index >= total {
        bail!(
            "slide {} does not exist; the presentation has {total} slides",
            index + 1
        );
    }

    activate_slide(page, index, settle)?;
    page.capture_screenshot(path)?;
    info!(slide = index + 1, path = %path.display(), "captured slide");
    Ok(())
}

pub(crate) fn broken_image_lines(issues: &[SlideIssue]) -> Vec<String> {
    let mut by_slide: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for issue in issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::BrokenImage)
    {
        by_slide
            .entry(issue.slide_number)
            .or_default()
            .push(&issue.detail);
    }

    by_slide
        .into_iter()
        .map(|(slide_number, sources)| format!("slide-{slide_number:02}: {}", sources.join(", ")))
        .collect()
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove stale {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::model::{Viewport, slide_label};
    use crate::presentation::fake::{FakeDeck, visible_slide};
    use crate::presentation::{ImageProbe, SlideSnapshot};

    fn issue(slide_number: usize, kind: IssueKind, detail: &str) -> SlideIssue {
        SlideIssue {
            slide_number,
            slide_label: slide_label(slide_number, 12),
            kind,
            detail: detail.to_string(),
        }
    }

    #[test]
    fn broken_images_are_grouped_per_slide() {
        let lines = broken_image_lines(&[
            issue(11, IssueKind::BrokenImage, "img/c.png"),
            issue(2, IssueKind::BrokenImage, "img/a.png"),
            issue(2, IssueKind::Overflow, "div (L:0 R:1 T:0 B:1)"),
            issue(2, IssueKind::BrokenImage, "img/b.png"),
        ]);

        assert_eq!(
            lines,
            vec!["slide-02: img/a.png, img/b.png", "slide-11: img/c.png"]
        );
    }

    #[test]
    fn no_broken_images_yields_no_lines() {
        assert!(broken_image_lines(&[issue(1, IssueKind::NotVisible, "x")]).is_empty());
    }

    #[test]
    fn capture_sweep_names_every_screenshot_and_flags_broken_images() {
        let viewport = Viewport::default();
        let mut broken = visible_slide(viewport);
        broken.images.push(ImageProbe {
            src: "img/gone.svg".to_string(),
            complete: false,
            natural_width: 0.0,
            natural_height: 0.0,
        });
        let mut deck = FakeDeck::with_slides(vec![visible_slide(viewport), broken]);
        let dir = tempfile::tempdir().expect("tempdir");

        let config = SweepConfig {
            settle_delay: Duration::ZERO,
            capture_console: false,
            screenshots_dir: Some(dir.path().to_path_buf()),
            ..SweepConfig::default()
        };
        let outcome = SweepEngine::new(config)
            .with_check(Box::new(BrokenImageCheck))
            .run(&mut deck)
            .expect("capture sweep");

        assert_eq!(
            deck.screenshots,
            vec![dir.path().join("slide-01.png"), dir.path().join("slide-02.png")]
        );
        assert_eq!(broken_image_lines(&outcome.issues), vec!["slide-02: img/gone.svg"]);
    }

    fn capture_config() -> SweepConfig {
        SweepConfig {
            settle_delay: Duration::ZERO,
            capture_console: false,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn capture_deck_writes_broken_image_list_and_succeeds() {
        let viewport = Viewport::default();
        let mut broken = visible_slide(viewport);
        broken.images.push(ImageProbe {
            src: "img/gone.svg".to_string(),
            complete: true,
            natural_width: 0.0,
            natural_height: 0.0,
        });
        let mut deck = FakeDeck::with_slides(vec![broken, visible_slide(viewport)]);
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(BROKEN_IMAGES_FILE), "slide-09: stale.png\n")
            .expect("seed stale list");

        let config = SweepConfig {
            screenshots_dir: Some(dir.path().to_path_buf()),
            ..capture_config()
        };
        let status = capture_deck(&mut deck, config, dir.path()).expect("capture");

        assert_eq!(status, CommandStatus::Success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(BROKEN_IMAGES_FILE)).expect("list"),
            "slide-01: img/gone.svg\n"
        );
    }

    #[test]
    fn capture_deck_fails_when_a_screenshot_fails() {
        let viewport = Viewport::default();
        let mut deck = FakeDeck::with_slides(vec![visible_slide(viewport); 3]);
        deck.failing_screenshots.insert(1);
        let dir = tempfile::tempdir().expect("tempdir");

        let config = SweepConfig {
            screenshots_dir: Some(dir.path().to_path_buf()),
            ..capture_config()
        };
        let status = capture_deck(&mut deck, config, dir.path()).expect("capture");

        assert_eq!(status, CommandStatus::IssuesFound);
        assert_eq!(deck.screenshots.len(), 2);
        assert!(!dir.path().join(BROKEN_IMAGES_FILE).exists());
    }

    #[test]
    fn single_capture_targets_the_requested_slide() {
        let mut deck = FakeDeck::with_slides(vec![SlideSnapshot::default(); 4]);
        let path = PathBuf::from("shots/slide-03.png");

        capture_one(
            &mut deck,
            2,
            Duration::ZERO,
            Duration::from_millis(100),
            &path,
        )
        .expect("capture");

        assert_eq!(deck.navigations, vec![2]);
        assert_eq!(deck.revealed, vec![2]);
        assert_eq!(deck.screenshots, vec![path]);
    }

    #[test]
    fn single_capture_rejects_slides_past_the_end() {
        let mut deck = FakeDeck::with_slides(vec![SlideSnapshot::default(); 2]);

        let err = capture_one(
            &mut deck,
            4,
            Duration::ZERO,
            Duration::from_millis(100),
            Path::new("unused.png"),
        )
        .expect_err("slide 5 of 2 must fail");

        assert!(err.to_string().contains("slide 5 does not exist"));
        assert!(deck.screenshots.is_empty());
    }

    #[test]
    fn stale_broken_image_list_is_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(BROKEN_IMAGES_FILE);
        std::fs::write(&path, "slide-01: old.png\n").expect("seed");

        remove_stale(&path).expect("remove");
        assert!(!path.exists());
        remove_stale(&path).expect("missing file is fine");
    }
}
