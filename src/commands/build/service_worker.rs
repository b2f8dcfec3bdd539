use super::*;

const CACHE_NAME_PATTERN: &str = r"const CACHE_NAME = '([^']*)-v[^']*'";

pub fn cache_name(source: &str) -> Result<Option<String>> {
    let pattern =
        Regex::new(r"const CACHE_NAME = '([^']*)'").context("failed to compile cache name regex")?;
    Ok(pattern
        .captures(source)
        .map(|captures| captures[1].to_string()))
}

pub fn rewrite_cache_name(source: &str, version: &str) -> Result<String> {
    let pattern = Regex::new(CACHE_NAME_PATTERN).context("failed to compile cache name regex")?;
    if !pattern.is_match(source) {
        bail!("no `const CACHE_NAME = '<prefix>-v<version>'` declaration found");
    }

    let rewritten = pattern.replacen(source, 1, |captures: &regex::Captures<'_>| {
        format!("const CACHE_NAME = '{}-v{version}'", &captures[1])
    });
    Ok(rewritten.into_owned())
}

pub fn precache_entries(source: &str) -> Result<Vec<String>> {
    let list_pattern = Regex::new(r"(?s)ASSETS_TO_CACHE\s*=\s*\[(.*?)\]")
        .context("failed to compile precache list regex")?;
    let entry_pattern =
        Regex::new(r#"'([^']*)'|"([^"]*)""#).context("failed to compile precache entry regex")?;

    let Some(list) = list_pattern.captures(source).and_then(|captures| captures.get(1)) else {
        return Ok(Vec::new());
    };

    Ok(entry_pattern
        .captures_iter(list.as_str())
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|found| found.as_str().to_string())
        .collect())
}

pub fn missing_precache_entries(root: &Path, entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| {
            let relative = entry.trim_start_matches("./").trim_start_matches('/');
            !relative.is_empty() && !root.join(relative).exists()
        })
        .cloned()
        .collect()
}
