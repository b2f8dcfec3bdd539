use super::*;

struct SweepPlan {
    title: &'static str,
    url: String,
    session: SessionConfig,
    config: SweepConfig,
    checks: Vec<CheckKind>,
    report_path: PathBuf,
    json_path: Option<PathBuf>,
}

pub fn run_check(args: CheckArgs) -> Result<CommandStatus> {
    let checks = resolve_checks(&args.sweep.checks, CHECK_DEFAULTS);
    let config = SweepConfig {
        settle_delay: Duration::from_millis(args.sweep.settle_ms.unwrap_or(800)),
        overflow_cap: args.sweep.overflow_cap.unwrap_or(5),
        ..sweep_config(&args.session, &args.sweep, &checks)
    };

    execute(SweepPlan {
        title: "Slide check report",
        url: args.session.url.clone(),
        session: session_config(&args.session, true),
        config,
        checks,
        report_path: args
            .sweep
            .report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("check-slides-report.txt")),
        json_path: args.sweep.json_report.clone(),
    })
}

pub fn run_review(args: ReviewArgs) -> Result<CommandStatus> {
    let checks = resolve_checks(&args.sweep.checks, REVIEW_DEFAULTS);
    let config = SweepConfig {
        settle_delay: Duration::from_millis(args.sweep.settle_ms.unwrap_or(400)),
        dwell_delay: Duration::from_millis(args.slide_delay_ms),
        overflow_cap: args.sweep.overflow_cap.unwrap_or(6),
        screenshots_dir: args.screenshots.then(|| args.screenshots_dir.clone()),
        ..sweep_config(&args.session, &args.sweep, &checks)
    };

    execute(SweepPlan {
        title: "Slide review report",
        url: args.session.url.clone(),
        session: session_config(&args.session, false),
        config,
        checks,
        report_path: args
            .sweep
            .report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("review-slides-report.txt")),
        json_path: args.sweep.json_report.clone(),
    })
}

pub fn session_config(args: &SessionArgs, default_headless: bool) -> SessionConfig {
    SessionConfig {
        webdriver_url: args.webdriver_url.clone(),
        browser: args.browser,
        headless: args.headless.unwrap_or(default_headless),
        viewport: args.viewport,
        page_load_timeout: PAGE_LOAD_TIMEOUT,
        script_timeout: SCRIPT_TIMEOUT,
    }
}

fn sweep_config(session: &SessionArgs, sweep: &SweepArgs, checks: &[CheckKind]) -> SweepConfig {
    SweepConfig {
        viewport: session.viewport,
        tolerance_px: sweep.tolerance_px,
        ready_timeout: Duration::from_millis(session.ready_timeout_ms),
        capture_console: checks.contains(&CheckKind::ConsoleError),
        ..SweepConfig::default()
    }
}

fn resolve_checks(requested: &[CheckKind], defaults: &[CheckKind]) -> Vec<CheckKind> {
    if requested.is_empty() {
        defaults.to_vec()
    } else {
        requested.to_vec()
    }
}

fn execute(plan: SweepPlan) -> Result<CommandStatus> {
    let engine = SweepEngine::new(plan.config).with_checks(checks_for(&plan.checks));

    let mut page = RevealPage::open(&plan.session, &plan.url)?;
    let outcome = engine.run(&mut page);
    if let Err(err) = page.close() {
        warn!(error = %err, "failed to close browser session");
    }
    let outcome = outcome?;

    if let Some(dir) = &engine.config().screenshots_dir {
        info!(
            dir = %dir.display(),
            count = outcome.screenshots.len(),
            "screenshots saved"
        );
    }

    let report = build_report(plan.title, &plan.url, engine.config().viewport, outcome);
    let text = write_reports(&report, &plan.report_path, plan.json_path.as_deref())?;
    print_report(&text)?;
    info!(
        path = %plan.report_path.display(),
        issues = report.issues.len(),
        "report written"
    );

    Ok(if report.is_clean() {
        CommandStatus::Success
    } else {
        CommandStatus::IssuesFound
    })
}
