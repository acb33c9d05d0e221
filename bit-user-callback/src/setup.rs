//! One-shot setup actions: writing a config template and installing the
//! callback link where Back In Time looks for it.

use crate::config::CallbackConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name Back In Time expects for the callback executable.
pub const CALLBACK_LINK_NAME: &str = "user-callback";

/// Write the default configuration to `path`.
pub async fn generate_config(path: &Path) -> Result<()> {
    CallbackConfig::template()
        .save_to(path)
        .await
        .context("failed to write configuration")?;
    Ok(())
}

/// Symlink the running executable into `dir` as `user-callback`.
pub fn install_link(dir: &Path) -> Result<PathBuf> {
    let exe = std::env::current_exe().context("could not determine executable path")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create {}", dir.display()))?;

    let link = dir.join(CALLBACK_LINK_NAME);
    symlink(&exe, &link).with_context(|| format!("could not create symbolic link {}", link.display()))?;
    Ok(link)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Back In Time callbacks are only supported on unix",
    ))
}
