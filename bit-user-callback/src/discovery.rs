//! Wireless network presence detection
//!
//! This module handles:
//! - Running `iwconfig` and collecting the ESSIDs it reports
//! - Decoding the quoted ESSID values
//! - Testing whether the configured network is one of them

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

const ESSID_MARKER: &str = "ESSID:";

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to run {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} exited with {status}: {stderr}", path.display())]
    Exit {
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("invalid ESSID {text:?}: {reason}")]
    Unquote {
        /// Networks decoded before the failing line.
        partial: Vec<String>,
        text: String,
        reason: &'static str,
    },
}

/// Source of the ESSIDs the host is currently associated with.
pub trait EssidScanner {
    fn scan(&self) -> impl Future<Output = Result<Vec<String>, ScanError>>;
}

/// Result of a successful presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Connected,
    NotConnected,
}

/// Scans by running the `iwconfig` executable without arguments.
#[derive(Debug, Clone)]
pub struct IwconfigScanner {
    path: PathBuf,
}

impl IwconfigScanner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EssidScanner for IwconfigScanner {
    async fn scan(&self) -> Result<Vec<String>, ScanError> {
        debug!("Running {}", self.path.display());

        let output = AsyncCommand::new(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ScanError::Spawn { path: self.path.clone(), source })?;

        if !output.status.success() {
            return Err(ScanError::Exit {
                path: self.path.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_essids(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract every quoted value following `ESSID:` in `iwconfig` output.
///
/// Lines without the marker are ignored. An undecodable value stops parsing
/// and returns the networks found so far inside the error.
pub fn parse_essids(output: &str) -> Result<Vec<String>, ScanError> {
    let mut essids = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(idx) = line.find(ESSID_MARKER) else {
            continue;
        };
        let text = &line[idx + ESSID_MARKER.len()..];
        match unquote(text) {
            Ok(essid) => essids.push(essid),
            Err(reason) => {
                return Err(ScanError::Unquote {
                    partial: essids,
                    text: text.to_string(),
                    reason,
                })
            }
        }
    }
    Ok(essids)
}

/// Decode a double-quoted string with C style escapes, as printed by
/// wireless-tools for non-printable ESSID bytes.
fn unquote(text: &str) -> Result<String, &'static str> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or("value is not a quoted string")?;

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err("unescaped quote inside value"),
            '\\' => match chars.next().ok_or("dangling escape")? {
                '\\' => bytes.push(b'\\'),
                '"' => bytes.push(b'"'),
                '\'' => bytes.push(b'\''),
                'n' => bytes.push(b'\n'),
                't' => bytes.push(b'\t'),
                'r' => bytes.push(b'\r'),
                'x' => {
                    let hex: String = chars.by_ref().take(2).collect();
                    if hex.len() != 2 {
                        return Err("short \\x escape");
                    }
                    bytes.push(u8::from_str_radix(&hex, 16).map_err(|_| "bad \\x escape")?);
                }
                _ => return Err("unknown escape"),
            },
            c => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(bytes).map_err(|_| "value is not valid UTF-8")
}

/// Whether `essid` is among the networks reported by `scanner`.
///
/// Scanner failures are returned as errors, never as "not connected".
pub async fn check_presence<S: EssidScanner>(scanner: &S, essid: &str) -> Result<Presence, ScanError> {
    let essids = scanner.scan().await?;
    debug!("Associated networks: {:?}", essids);

    if essids.iter().any(|e| e == essid) {
        Ok(Presence::Connected)
    } else {
        Ok(Presence::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticScanner;

    const IWCONFIG_OUTPUT: &str = r#"
lo        no wireless extensions.

wlp3s0    IEEE 802.11  ESSID:"HomeNet"
          Mode:Managed  Frequency:5.18 GHz  Access Point: 00:11:22:33:44:55
          Bit Rate=400 Mb/s   Tx-Power=22 dBm

wlx001122 IEEE 802.11  ESSID:"Guest"
          Mode:Managed  Frequency:2.412 GHz
"#;

    #[test]
    fn test_parse_iwconfig_output() {
        let essids = parse_essids(IWCONFIG_OUTPUT).unwrap();
        assert_eq!(essids, vec!["HomeNet".to_string(), "Guest".to_string()]);
    }

    #[test]
    fn test_lines_without_marker_are_ignored() {
        assert!(parse_essids("eth0      no wireless extensions.\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_unquote_failure_keeps_partial_result() {
        let output = "wlan0 IEEE 802.11 ESSID:\"HomeNet\"\nwlan1 IEEE 802.11 ESSID:off/any\n";
        match parse_essids(output) {
            Err(ScanError::Unquote { partial, text, .. }) => {
                assert_eq!(partial, vec!["HomeNet".to_string()]);
                assert_eq!(text, "off/any");
            }
            other => panic!("expected unquote error, got {other:?}"),
        }
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""Cafe \"Net\"""#).unwrap(), "Cafe \"Net\"");
        assert_eq!(unquote(r#""a\x41b""#).unwrap(), "aAb");
        assert_eq!(unquote(r#""Café""#).unwrap(), "Café");
        assert!(unquote("HomeNet").is_err());
        assert!(unquote(r#""bad\q""#).is_err());
        assert!(unquote(r#""half"quoted""#).is_err());
    }

    #[tokio::test]
    async fn test_presence_exact_match() {
        let scanner = StaticScanner(Some(vec!["HomeNet", "Guest"]));
        assert_eq!(check_presence(&scanner, "HomeNet").await.unwrap(), Presence::Connected);
        assert_eq!(check_presence(&scanner, "Office").await.unwrap(), Presence::NotConnected);
        assert_eq!(check_presence(&scanner, "homenet").await.unwrap(), Presence::NotConnected);
        assert_eq!(check_presence(&scanner, "Home").await.unwrap(), Presence::NotConnected);
    }

    #[tokio::test]
    async fn test_scanner_failure_is_an_error() {
        let scanner = StaticScanner(None);
        assert!(check_presence(&scanner, "HomeNet").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_spawn() {
        let scanner = IwconfigScanner::new("/nonexistent/iwconfig");
        assert!(matches!(scanner.scan().await, Err(ScanError::Spawn { .. })));
    }
}
