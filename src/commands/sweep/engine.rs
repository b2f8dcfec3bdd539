use super::*;

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub viewport: Viewport,
    pub tolerance_px: f64,
    pub settle_delay: Duration,
    pub dwell_delay: Duration,
    pub ready_timeout: Duration,
    pub ready_poll: Duration,
    pub overflow_cap: usize,
    pub capture_console: bool,
    pub screenshots_dir: Option<PathBuf>,
    pub catalog: SelectorCatalog,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            tolerance_px: 2.0,
            settle_delay: Duration::from_millis(800),
            dwell_delay: Duration::ZERO,
            ready_timeout: Duration::from_secs(10),
            ready_poll: READY_POLL_INTERVAL,
            overflow_cap: 5,
            capture_console: true,
            screenshots_dir: None,
            catalog: SelectorCatalog::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub total_slides: usize,
    pub visited: Vec<usize>,
    pub issues: Vec<SlideIssue>,
    pub screenshots: Vec<PathBuf>,
}

pub fn wait_until_ready<P: SlidePage + ?Sized>(
    page: &mut P,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let started = Instant::now();
    loop {
        match page.is_ready() {
            Ok(true) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "presentation ready");
                return Ok(());
            }
            Ok(false) => {}
            Err(err) => debug!(error = %err, "readiness probe failed; retrying"),
        }
        if started.elapsed() >= timeout {
            bail!(
                "presentation did not become ready within {} ms",
                timeout.as_millis()
            );
        }
        thread::sleep(poll);
    }
}

pub fn activate_slide<P: SlidePage + ?Sized>(
    page: &mut P,
    index: usize,
    settle: Duration,
) -> Result<()> {
    page.go_to_slide(index)?;
    page.reveal_fragments(index)?;
    if !settle.is_zero() {
        thread::sleep(settle);
    }
    Ok(())
}

pub struct SweepEngine {
    config: SweepConfig,
    checks: Vec<Box<dyn SlideCheck>>,
}

impl SweepEngine {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, check: Box<dyn SlideCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_checks(mut self, checks: Vec<Box<dyn SlideCheck>>) -> Self {
        self.checks.extend(checks);
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn run<P: SlidePage + ?Sized>(&self, page: &mut P) -> Result<SweepOutcome> {
        wait_until_ready(page, self.config.ready_timeout, self.config.ready_poll)?;
        let total = page.slide_count()?;
        let enabled: BTreeSet<IssueKind> = self.checks.iter().map(|check| check.kind()).collect();
        info!(
            total_slides = total,
            checks = %enabled.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(","),
            console = self.config.capture_console,
            "starting slide sweep"
        );

        if let Some(dir) = &self.config.screenshots_dir {
            ensure_directory(dir)?;
        }

        let mut console_errors: Vec<(usize, String)> = Vec::new();
        if self.config.capture_console {
            drain_console(page, 0, &mut console_errors);
        }

        let ctx = CheckContext {
            viewport: self.config.viewport,
            tolerance_px: self.config.tolerance_px,
            overflow_cap: self.config.overflow_cap,
        };
        let mut outcome = SweepOutcome {
            total_slides: total,
            ..SweepOutcome::default()
        };

        for index in 0..total {
            let slide_number = index + 1;
            let label = slide_label(slide_number, total);
            let mut found: Vec<(IssueKind, String)> = Vec::new();

            match activate_slide(page, index, self.config.settle_delay) {
                Ok(()) => {
                    verify_position(page, index);
                    found.extend(self.inspect(page, index, &enabled, &ctx));
                }
                Err(err) => found.push((
                    IssueKind::ProbeFailed,
                    format!("could not activate slide: {err:#}"),
                )),
            }

            if let Some(dir) = &self.config.screenshots_dir {
                let path = dir.join(slide_file_name(slide_number));
                match page.capture_screenshot(&path) {
                    Ok(()) => outcome.screenshots.push(path),
                    Err(err) => found.push((
                        IssueKind::ProbeFailed,
                        format!("screenshot failed: {err:#}"),
                    )),
                }
            }

            if found.is_empty() {
                info!(slide = %label, "ok");
            } else {
                info!(
                    slide = %label,
                    issues = found.len(),
                    kinds = %found.iter().map(|(kind, _)| kind.as_str()).collect::<Vec<_>>().join(","),
                    "issues found"
                );
            }

            outcome
                .issues
                .extend(found.into_iter().map(|(kind, detail)| SlideIssue {
                    slide_number,
                    slide_label: label.clone(),
                    kind,
                    detail,
                }));
            outcome.visited.push(index);

            if !self.config.dwell_delay.is_zero() {
                thread::sleep(self.config.dwell_delay);
            }

            // Drained after the dwell so errors raised while the slide is on screen stay with it.
            if self.config.capture_console {
                drain_console(page, slide_number, &mut console_errors);
            }
        }

        if self.config.capture_console {
            drain_console(page, total, &mut console_errors);
        }

        outcome
            .issues
            .extend(console_errors.into_iter().map(|(slide_number, text)| SlideIssue {
                slide_number,
                slide_label: slide_label(slide_number, total),
                kind: IssueKind::ConsoleError,
                detail: truncate_chars(&text, CONSOLE_DETAIL_MAX_CHARS),
            }));

        info!(
            visited = outcome.visited.len(),
            issues = outcome.issues.len(),
            screenshots = outcome.screenshots.len(),
            "slide sweep finished"
        );
        Ok(outcome)
    }

    fn inspect<P: SlidePage + ?Sized>(
        &self,
        page: &mut P,
        index: usize,
        enabled: &BTreeSet<IssueKind>,
        ctx: &CheckContext,
    ) -> Vec<(IssueKind, String)> {
        if self.checks.is_empty() {
            return Vec::new();
        }

        let request = self
            .config
            .catalog
            .probe_request(index, self.config.viewport, enabled);
        let snapshot = match page.snapshot(&request) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(slide = index + 1, error = %err, "slide probe failed");
                return vec![(IssueKind::ProbeFailed, format!("probe failed: {err:#}"))];
            }
        };

        self.checks
            .iter()
            .flat_map(|check| {
                check
                    .inspect(&snapshot, ctx)
                    .into_iter()
                    .map(move |detail| (check.kind(), detail))
            })
            .collect()
    }
}

fn verify_position<P: SlidePage + ?Sized>(page: &mut P, index: usize) {
    match page.current_indices() {
        Ok(indices) => {
            debug!(
                h = indices.horizontal,
                v = indices.vertical,
                f = ?indices.fragment,
                "active slide indices"
            );
            if indices.horizontal != index {
                warn!(
                    expected = index,
                    actual = indices.horizontal,
                    "presentation reports a different active slide"
                );
            }
        }
        Err(err) => debug!(error = %err, "could not read active slide indices"),
    }
}

fn drain_console<P: SlidePage + ?Sized>(
    page: &mut P,
    slide_number: usize,
    sink: &mut Vec<(usize, String)>,
) {
    match page.drain_console_errors() {
        Ok(errors) => sink.extend(errors.into_iter().map(|text| (slide_number, text))),
        Err(err) => warn!(slide = slide_number, error = %err, "failed to read console errors"),
    }
}
