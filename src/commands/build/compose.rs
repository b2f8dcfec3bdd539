use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub header: String,
    pub fragments: Vec<Fragment>,
    pub footer: String,
}

#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub html: String,
    pub content_hash: String,
    pub marker: String,
    pub slide_count: usize,
}

pub fn load_metadata(path: &Path) -> Result<ProjectMetadata> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read metadata document {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse metadata document {}", path.display()))
}

pub fn load_inputs(config: &BuildConfig) -> Result<BuildInputs> {
    let fragments = load_fragments(&config.slides_dir, &config.fragment_extension)?;
    if fragments.is_empty() {
        warn!(
            slides_dir = %config.slides_dir.display(),
            extension = %config.fragment_extension,
            "no slide fragments found"
        );
    }
    for (position, fragment) in fragments.iter().enumerate() {
        debug!(slide = position + 1, fragment = %fragment.name, "slide order");
    }

    Ok(BuildInputs {
        header: read_text(&config.header_path)?,
        fragments,
        footer: read_text(&config.footer_path)?,
    })
}

pub fn load_fragments(slides_dir: &Path, extension: &str) -> Result<Vec<Fragment>> {
    discover_fragments(slides_dir, extension)?
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(ToOwned::to_owned)
                .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;
            let content = read_text(&path)?;
            Ok(Fragment { name, content })
        })
        .collect()
}

pub fn discover_fragments(slides_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(slides_dir)
        .with_context(|| format!("failed to read {}", slides_dir.display()))?;

    let mut fragments = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", slides_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == extension)
            .unwrap_or(false);

        if matches_extension {
            fragments.push(path);
        }
    }

    fragments.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(fragments)
}

pub fn join_fragments(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.content.as_str())
        .collect::<Vec<&str>>()
        .join(FRAGMENT_SEPARATOR)
}

pub fn assemble(inputs: &BuildInputs) -> String {
    format!(
        "{}\n{}\n{}",
        inputs.header,
        join_fragments(&inputs.fragments),
        inputs.footer
    )
}

pub fn content_hash(html: &str) -> String {
    let mut digest = sha256_hex(html.as_bytes());
    digest.truncate(CONTENT_HASH_LEN);
    digest
}

pub fn build_marker(built_at: DateTime<Utc>, content_hash: &str, version: &str) -> String {
    format!(
        "<!-- Build: {} | Hash: {content_hash} | Version: {version} -->",
        iso_millis_string(built_at)
    )
}

pub fn insert_marker(html: &str, marker: &str) -> Result<String> {
    let Some(position) = html.find("</head>") else {
        bail!("document has no </head> element to carry the build marker");
    };

    let mut stamped = String::with_capacity(html.len() + marker.len() + 1);
    stamped.push_str(&html[..position]);
    stamped.push_str(marker);
    stamped.push('\n');
    stamped.push_str(&html[position..]);
    Ok(stamped)
}

pub fn compose_document(
    inputs: &BuildInputs,
    metadata: &ProjectMetadata,
    built_at: DateTime<Utc>,
    allow_unresolved: bool,
) -> Result<ComposedDocument> {
    let html = replace_placeholders(&assemble(inputs), metadata);

    let unresolved = unresolved_placeholders(&html)?;
    if !unresolved.is_empty() {
        if !allow_unresolved {
            bail!(
                "unresolved placeholders in composed document: {}",
                unresolved.join(", ")
            );
        }
        warn!(tokens = %unresolved.join(", "), "leaving unresolved placeholders in place");
    }

    let content_hash = content_hash(&html);
    let marker = build_marker(built_at, &content_hash, &metadata.project.version);
    let html = insert_marker(&html, &marker)?;

    Ok(ComposedDocument {
        html,
        content_hash,
        marker,
        slide_count: inputs.fragments.len(),
    })
}
