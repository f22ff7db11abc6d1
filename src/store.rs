//! Reading and atomically writing the configuration file.
//!
//! Files are pretty-printed JSON with every object's keys sorted, so the
//! same document always produces the same bytes. Writes go to a temporary
//! sibling that is renamed over the target, so readers see either the old
//! file or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::document::Config;
use crate::error::{Error, Result};

/// Loads the document at `path`.
///
/// A missing file yields [`Error::NotInitialized`]. Mount points stored
/// under their on-disk names are moved back to the in-memory names.
pub fn load(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotInitialized {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut cfg: Config = serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.mounts.adopt_disk_names();

    debug!("Loaded configuration from {}", path.display());
    Ok(cfg)
}

/// Canonical on-disk encoding of `cfg`.
pub fn to_bytes(cfg: &Config) -> Result<Vec<u8>> {
    let mut on_disk = cfg.clone();
    on_disk.mounts.prepare_for_disk();

    // Going through Value sorts the keys of every object.
    let value = serde_json::to_value(&on_disk).map_err(Error::Encode)?;
    let mut bytes = serde_json::to_vec_pretty(&value).map_err(Error::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes `cfg` to `path`, creating parent directories as needed.
///
/// The file is readable and writable by the owner only.
pub fn store(path: impl AsRef<Path>, cfg: &Config) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(cfg)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    #[cfg(unix)]
    {
        if let Err(e) = fs::File::open(dir).and_then(|dir| dir.sync_all()) {
            warn!("Failed to sync directory {}: {}", dir.display(), e);
        }
    }

    debug!("Wrote configuration to {}", path.display());
    Ok(())
}
