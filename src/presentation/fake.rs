use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};

use super::*;

#[derive(Debug, Default)]
pub struct FakeDeck {
    pub snapshots: Vec<SlideSnapshot>,
    pub ready_on_poll: Option<usize>,
    pub polls: usize,
    pub startup_errors: Vec<String>,
    pub console_by_slide: BTreeMap<usize, Vec<String>>,
    pub failing_snapshots: BTreeSet<usize>,
    pub failing_navigation: BTreeSet<usize>,
    pub failing_screenshots: BTreeSet<usize>,
    pub console_delay: Option<Duration>,
    pub navigated_at: Option<Instant>,
    pub misreported_positions: BTreeMap<usize, usize>,
    pub current: Option<usize>,
    pub navigations: Vec<usize>,
    pub revealed: Vec<usize>,
    pub requests: Vec<ProbeRequest>,
    pub screenshots: Vec<PathBuf>,
    pub measured: Vec<usize>,
}

impl FakeDeck {
    pub fn with_slides(snapshots: Vec<SlideSnapshot>) -> Self {
        Self {
            snapshots,
            ready_on_poll: Some(1),
            ..Self::default()
        }
    }
}

pub fn visible_slide(viewport: Viewport) -> SlideSnapshot {
    SlideSnapshot {
        present: true,
        slide_rect: Some(Rect {
            left: 0.0,
            top: 0.0,
            right: f64::from(viewport.width),
            bottom: f64::from(viewport.height),
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
        }),
        ..SlideSnapshot::default()
    }
}

pub fn element(tag: &str, id: &str, class_name: &str, rect: Rect) -> ElementProbe {
    ElementProbe {
        tag: tag.to_string(),
        id: id.to_string(),
        class_name: class_name.to_string(),
        rect,
    }
}

pub fn rect(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
    Rect {
        left,
        top,
        right,
        bottom,
        width: right - left,
        height: bottom - top,
    }
}

impl Presentation for FakeDeck {
    fn is_ready(&mut self) -> Result<bool> {
        self.polls += 1;
        Ok(self.ready_on_poll.is_some_and(|poll| self.polls >= poll))
    }

    fn slide_count(&mut self) -> Result<usize> {
        Ok(self.snapshots.len())
    }

    fn go_to_slide(&mut self, index: usize) -> Result<()> {
        self.navigations.push(index);
        if self.failing_navigation.contains(&index) {
            bail!("navigation to slide index {index} rejected");
        }
        self.current = Some(index);
        self.navigated_at = Some(Instant::now());
        Ok(())
    }

    fn current_indices(&mut self) -> Result<SlideIndices> {
        let current = self.current.ok_or_else(|| anyhow!("no slide active"))?;
        Ok(SlideIndices {
            horizontal: self
                .misreported_positions
                .get(&current)
                .copied()
                .unwrap_or(current),
            vertical: 0,
            fragment: None,
        })
    }
}

impl SlidePage for FakeDeck {
    fn reveal_fragments(&mut self, index: usize) -> Result<()> {
        self.revealed.push(index);
        Ok(())
    }

    fn snapshot(&mut self, request: &ProbeRequest) -> Result<SlideSnapshot> {
        self.requests.push(request.clone());
        if self.failing_snapshots.contains(&request.index) {
            bail!("javascript error: probe threw");
        }
        Ok(self
            .snapshots
            .get(request.index)
            .cloned()
            .unwrap_or_default())
    }

    fn drain_console_errors(&mut self) -> Result<Vec<String>> {
        let Some(index) = self.current else {
            return Ok(std::mem::take(&mut self.startup_errors));
        };
        let pending = match (self.console_delay, self.navigated_at) {
            (Some(delay), Some(at)) => at.elapsed() < delay,
            _ => false,
        };
        if pending {
            return Ok(Vec::new());
        }
        Ok(self.console_by_slide.remove(&index).unwrap_or_default())
    }

    fn capture_screenshot(&mut self, path: &Path) -> Result<()> {
        if self
            .current
            .is_some_and(|index| self.failing_screenshots.contains(&index))
        {
            bail!("screenshot timed out");
        }
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }

    fn measure(&mut self, index: usize) -> Result<SlideMetrics> {
        if index >= self.snapshots.len() {
            bail!("slide {} does not exist", index + 1);
        }
        self.measured.push(index);
        Ok(SlideMetrics {
            slide: index + 1,
            slide_scroll_height: 1100.0,
            slide_client_height: 1080.0,
            slide_bounding_height: 1080.0,
            stage_height: Some(1080.0),
            overflow: 20.0,
            configured_width: serde_json::json!(1920),
            configured_height: serde_json::json!(1080),
            scale: 1.0,
            container_transform: "none".to_string(),
        })
    }
}
