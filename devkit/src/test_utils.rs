/*!
Test harness for the user-callback

Bundles the stubs with a scratch config home:
- `ConfigBuilder` produces `user-callback.json` documents
- `TestHarness` starts a stub server, a wake catcher and a fake `iwconfig`
  and pre-wires a config pointing at them
*/

use crate::http_stub::StubServer;
use crate::iwconfig_stub::FakeIwconfig;
use crate::udp_stub::WolCatcher;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEST_PROFILE: &str = "Main";
pub const TEST_ESSID: &str = "HomeNet";
pub const TEST_MAC: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];

/// Route test logs through the libtest capture.
pub fn init_test_logging() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Builder for `user-callback.json` documents.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    doc: Map<String, Value>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Profile `Main`, network `HomeNet`, fast delay and short timeout.
    pub fn new() -> Self {
        Self { doc: Map::new() }
            .set("profile", TEST_PROFILE)
            .set("essid", TEST_ESSID)
            .set("wake-mac", "00:11:22:33:44:55")
            .set("wake-delay", "50ms")
            .set("wake-timeout", "5s")
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.doc.insert(key.to_string(), value.into());
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.doc.remove(key);
        self
    }

    pub fn server(self, url: &str) -> Self {
        self.set("server", url)
    }

    pub fn remote(self, addr: &str) -> Self {
        self.set("wake-remote", addr)
    }

    pub fn iwconfig(self, path: &Path) -> Self {
        self.set("iwconfig-path", path.to_string_lossy().into_owned())
    }

    pub fn delay(self, delay: &str) -> Self {
        self.set("wake-delay", delay)
    }

    pub fn timeout(self, timeout: &str) -> Self {
        self.set("wake-timeout", timeout)
    }

    pub fn build(&self) -> Value {
        Value::Object(self.doc.clone())
    }

    pub fn to_json(&self) -> String {
        self.build().to_string()
    }

    /// Write to `<config_home>/backintime/user-callback.json`.
    pub fn write_to(&self, config_home: &Path) -> Result<PathBuf> {
        let dir = config_home.join("backintime");
        std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("user-callback.json");
        let content = serde_json::to_string_pretty(&self.build())?;
        std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Stubs plus a scratch `XDG_CONFIG_HOME`.
pub struct TestHarness {
    pub server: StubServer,
    pub catcher: WolCatcher,
    pub iwconfig: FakeIwconfig,
    pub config_home: TempDir,
}

impl TestHarness {
    /// Server answering `statuses`, host associated with `essids`.
    pub async fn new(statuses: impl IntoIterator<Item = u16>, essids: &[&str]) -> Result<Self> {
        init_test_logging();
        Ok(Self {
            server: StubServer::start(statuses).await?,
            catcher: WolCatcher::bind().await?,
            iwconfig: FakeIwconfig::connected_to(essids)?,
            config_home: tempfile::tempdir()?,
        })
    }

    /// Config wired to this harness' stubs.
    pub fn config(&self) -> ConfigBuilder {
        ConfigBuilder::new()
            .server(&self.server.url("/ready"))
            .remote(&self.catcher.addr().to_string())
            .iwconfig(self.iwconfig.path())
    }

    pub fn config_home(&self) -> &Path {
        self.config_home.path()
    }

    pub fn write_config(&self, builder: &ConfigBuilder) -> Result<PathBuf> {
        builder.write_to(self.config_home())
    }
}
