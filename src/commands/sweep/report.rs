use super::*;

pub fn build_report(
    title: &str,
    url: &str,
    viewport: Viewport,
    outcome: SweepOutcome,
) -> SweepReport {
    SweepReport {
        title: title.to_string(),
        url: url.to_string(),
        viewport,
        total_slides: outcome.total_slides,
        generated_at: now_utc_string(),
        issues: outcome.issues,
    }
}

pub fn render_text_report(report: &SweepReport) -> String {
    let mut lines = vec![
        report.title.clone(),
        format!("URL: {}", report.url),
        format!("Viewport: {}", report.viewport),
        format!("Total slides: {}", report.total_slides),
        format!("Date: {}", report.generated_at),
        String::new(),
    ];

    if report.is_clean() {
        lines.push("No issues detected.".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    let counts = report.counts_by_kind();
    let summary = counts
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("Issues: {} ({summary})", report.issues.len()));
    lines.push(String::new());
    lines.push("Legend:".to_string());
    for kind in counts.keys() {
        lines.push(format!("  [{kind}] {}", kind.legend()));
    }
    lines.push(String::new());

    for (slide_number, issues) in report.issues_by_slide() {
        let label = issues
            .first()
            .map(|issue| issue.slide_label.clone())
            .unwrap_or_else(|| slide_label(slide_number, report.total_slides));
        lines.push(format!("--- {label} ---"));
        for issue in issues {
            lines.push(format!("  [{}] {}", issue.kind, issue.detail));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn print_report(text: &str) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    write!(output, "{text}")?;
    if !text.ends_with('\n') {
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}

pub fn write_reports(report: &SweepReport, text_path: &Path, json_path: Option<&Path>) -> Result<String> {
    let text = render_text_report(report);
    write_text(text_path, &text)
        .with_context(|| format!("failed to write sweep report {}", text_path.display()))?;
    if let Some(json_path) = json_path {
        write_json_pretty(json_path, report)?;
    }
    Ok(text)
}
