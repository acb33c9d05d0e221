//! In-process fakes for the collaborator traits.

use crate::discovery::{EssidScanner, ScanError};
use crate::readiness::{Clock, ReadinessProbe};
use crate::wol::{WolError, WolSender};
use mac_address::MacAddress;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Answers from a script, then `false` forever.
pub struct ScriptedProbe {
    answers: RefCell<VecDeque<bool>>,
    calls: Cell<u32>,
}

impl ScriptedProbe {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl ReadinessProbe for ScriptedProbe {
    async fn probe(&self) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Cell<u32>,
}

impl RecordingSender {
    pub fn sent(&self) -> u32 {
        self.sent.get()
    }
}

impl WolSender for RecordingSender {
    async fn send(
        &self,
        _mac: Option<MacAddress>,
        _local: Option<SocketAddr>,
        _remote: SocketAddr,
    ) -> Result<(), WolError> {
        self.sent.set(self.sent.get() + 1);
        Ok(())
    }
}

pub struct FailingSender;

impl WolSender for FailingSender {
    async fn send(
        &self,
        _mac: Option<MacAddress>,
        _local: Option<SocketAddr>,
        _remote: SocketAddr,
    ) -> Result<(), WolError> {
        Err(WolError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "broadcast denied")))
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    base: Instant,
    offset: Cell<Duration>,
    sleeps: Cell<u32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: Cell::new(0),
        }
    }

    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.offset.set(self.offset.get() + duration);
    }
}

pub struct StaticScanner(pub Option<Vec<&'static str>>);

impl EssidScanner for StaticScanner {
    async fn scan(&self) -> Result<Vec<String>, ScanError> {
        match &self.0 {
            Some(essids) => Ok(essids.iter().map(|s| s.to_string()).collect()),
            None => Err(ScanError::Spawn {
                path: PathBuf::from("/sbin/iwconfig"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }
}
