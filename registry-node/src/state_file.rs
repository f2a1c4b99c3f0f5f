//! On-disk registry snapshots.

use std::path::Path;

use anyhow::{bail, Context};
use content_registry::{ContentRegistry, RegistrySnapshot};
use tracing::debug;

/// Load the registry stored at `path`.
pub fn load(path: &Path) -> anyhow::Result<ContentRegistry> {
    if !path.exists() {
        bail!(
            "no registry state at {}; run `registry-node init --admin <principal>` first",
            path.display()
        );
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading state {}", path.display()))?;
    let snapshot = RegistrySnapshot::from_json(&json)
        .with_context(|| format!("decoding state {}", path.display()))?;
    let registry = ContentRegistry::restore(snapshot)
        .with_context(|| format!("restoring state {}", path.display()))?;

    debug!(
        path = %path.display(),
        records = registry.content_count(),
        height = registry.block_height(),
        "Loaded registry state"
    );
    Ok(registry)
}

/// Write `snapshot` to `path` via a temp file and rename.
pub fn save(path: &Path, snapshot: &RegistrySnapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, snapshot.to_json()?)
        .with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replacing {}", path.display()))?;

    debug!(path = %path.display(), "Saved registry state");
    Ok(())
}
