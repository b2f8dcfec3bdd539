use super::*;

struct ServiceWorkerUpdate {
    path: PathBuf,
    previous_cache_name: Option<String>,
    original: String,
    contents: String,
}

pub fn run(args: BuildArgs) -> Result<CommandStatus> {
    let config = BuildConfig::from_args(&args);
    info!(root = %config.root.display(), "building presentation");

    let metadata = load_metadata(&config.data_path)?;
    info!(
        project = %metadata.project.name.as_deref().unwrap_or("unnamed"),
        version = %metadata.project.version,
        "loaded project metadata"
    );
    let inputs = load_inputs(&config)?;
    info!(slides = inputs.fragments.len(), "loaded slide fragments");

    let document = compose_document(&inputs, &metadata, Utc::now(), config.allow_unresolved)?;
    let service_worker = config
        .service_worker_path
        .as_deref()
        .map(|path| prepare_service_worker(path, &metadata.project.version))
        .transpose()?;

    if let Some(update) = &service_worker {
        write_text(&update.path, &update.contents)?;
        info!(
            path = %update.path.display(),
            previous = %update.previous_cache_name.as_deref().unwrap_or_default(),
            current = %cache_name(&update.contents)?.unwrap_or_default(),
            "service worker cache updated"
        );
    }

    if let Err(err) = write_text(&config.output_path, &document.html) {
        if let Some(update) = &service_worker {
            restore_service_worker(update);
        }
        return Err(err);
    }
    debug!(marker = %document.marker, "stamped build marker");
    info!(
        path = %config.output_path.display(),
        size_kb = %format!("{:.2}", document.html.len() as f64 / 1024.0),
        slides = document.slide_count,
        version = %metadata.project.version,
        hash = %document.content_hash,
        "built presentation"
    );

    if let Some(update) = &service_worker {
        let entries = precache_entries(&update.contents)?;
        for missing in missing_precache_entries(&config.root, &entries) {
            warn!(asset = %missing, "precached asset not found under project root");
        }
    }

    Ok(CommandStatus::Success)
}

fn prepare_service_worker(path: &Path, version: &str) -> Result<ServiceWorkerUpdate> {
    let source = read_text(path)?;
    let contents = rewrite_cache_name(&source, version)
        .with_context(|| format!("failed to update cache name in {}", path.display()))?;

    Ok(ServiceWorkerUpdate {
        path: path.to_path_buf(),
        previous_cache_name: cache_name(&source)?,
        original: source,
        contents,
    })
}

fn restore_service_worker(update: &ServiceWorkerUpdate) {
    match write_text(&update.path, &update.original) {
        Ok(()) => warn!(path = %update.path.display(), "document write failed; service worker restored"),
        Err(err) => warn!(
            path = %update.path.display(),
            error = %err,
            "document write failed and the service worker could not be restored"
        ),
    }
}
