use super::*;

pub fn placeholder_table(metadata: &ProjectMetadata) -> Vec<(&'static str, String)> {
    let project = &metadata.project;
    let metrics = &metadata.metrics;
    let author = &metadata.author;

    vec![
        ("{{project.version}}", project.version.clone()),
        ("{{project.lastUpdate}}", project.last_update.clone()),
        ("{{metrics.totalTests}}", metrics.total_tests.to_string()),
        ("{{metrics.backendTests}}", metrics.backend_tests.to_string()),
        ("{{metrics.frontendTests}}", metrics.frontend_tests.to_string()),
        ("{{metrics.backendCoverage}}", metrics.backend_coverage.clone()),
        ("{{metrics.frontendCoverage}}", metrics.frontend_coverage.clone()),
        ("{{metrics.globalCoverage}}", metrics.global_coverage.clone()),
        ("{{metrics.lastADR}}", metrics.last_adr.to_string()),
        ("{{releases.current}}", metadata.releases.current.clone()),
        ("{{api.version}}", metadata.api.version.clone()),
        ("{{api.endpoints}}", metadata.api.endpoints.to_string()),
        ("{{author.name}}", author.name.clone()),
        ("{{author.master}}", author.master.clone()),
        ("{{author.school}}", author.school.clone()),
        ("{{author.date}}", author.date.clone()),
    ]
}

pub fn replace_placeholders(content: &str, metadata: &ProjectMetadata) -> String {
    placeholder_table(metadata)
        .into_iter()
        .fold(content.to_string(), |acc, (token, value)| {
            acc.replace(token, &value)
        })
}

pub fn unresolved_placeholders(content: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(r"\{\{\s*[A-Za-z_][A-Za-z0-9_.\-]*\s*\}\}")
        .context("failed to compile placeholder regex")?;

    let tokens = pattern
        .find_iter(content)
        .map(|found| found.as_str().to_string())
        .collect::<BTreeSet<String>>();
    Ok(tokens.into_iter().collect())
}
