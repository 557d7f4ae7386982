use std::fs;
use std::path::PathBuf;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::Result;

/// Manages paths for catalog-sync configuration and cached data
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory (~/.catalog-sync)
    pub root: PathBuf,
    /// Configuration file path (~/.catalog-sync/config.toml)
    pub config_file: PathBuf,
    /// The single persisted catalog slot (~/.catalog-sync/catalogue_cache.json)
    pub cache_file: PathBuf,
}

impl Paths {
    /// Create a new Paths instance using the user's home directory
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME")?;
        Ok(Self::under(PathBuf::from(home).join(".catalog-sync")))
    }

    /// Lay out every path beneath an explicit root
    pub fn under(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.toml"),
            cache_file: root.join("catalogue_cache.json"),
            root,
        }
    }

    /// Ensure the root directory exists with proper permissions
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        // 700 = owner only
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.root, perms)?;
        }

        Ok(())
    }

    /// Check if the config file exists
    pub fn config_exists(&self) -> bool {
        self.config_file.exists()
    }
}
