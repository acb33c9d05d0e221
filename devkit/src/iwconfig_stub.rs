/*!
Fake `iwconfig` executable

Writes a small shell script printing canned output, so the real subprocess
scanner can be pointed at it through `iwconfig-path`.
*/

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FakeIwconfig {
    _dir: TempDir,
    path: PathBuf,
}

impl FakeIwconfig {
    /// Script printing `output` and exiting 0.
    pub fn with_output(output: &str) -> Result<Self> {
        Self::with_script(&format!("cat <<'IWCONFIG_EOF'\n{output}\nIWCONFIG_EOF\n"))
    }

    /// Script reporting association with each of `essids`.
    pub fn connected_to(essids: &[&str]) -> Result<Self> {
        let output: String = essids
            .iter()
            .enumerate()
            .map(|(i, essid)| format!("wlan{i}     IEEE 802.11  ESSID:\"{essid}\"\n          Mode:Managed\n\n"))
            .collect();
        Self::with_output(&format!("lo        no wireless extensions.\n\n{output}"))
    }

    /// Script failing with exit status 1.
    pub fn failing() -> Result<Self> {
        Self::with_script("echo 'iwconfig: no wireless tools' >&2\nexit 1\n")
    }

    fn with_script(body: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        let path = dir.path().join("iwconfig");
        std::fs::write(&path, format!("#!/bin/sh\n{body}"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        make_executable(&path)?;
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    anyhow::bail!("fake iwconfig needs a unix shell")
}
