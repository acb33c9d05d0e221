//! Readiness polling
//!
//! A poll session probes the server, sends a single wake packet the first
//! time the server is not ready, then sleeps a fixed delay and probes again
//! until the server answers `200 OK` or the timeout has elapsed.
//!
//! The timeout is only checked between iterations, so a slow probe can push
//! the total run time past it by one probe plus one delay.

use crate::config::CallbackConfig;
use crate::error::CallbackError;
use crate::wol::{WakeEmitter, WolSender};
use reqwest::StatusCode;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Transport timeout of a single HTTP probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// One readiness check against the server.
pub trait ReadinessProbe {
    /// `true` when the server reports ready. Transport failures are `false`.
    fn probe(&self) -> impl Future<Output = bool>;
}

/// Time source and sleeper for a poll session.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// `GET <url>`, ready on status 200.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self { client, url: url.into() })
    }
}

impl ReadinessProbe for HttpProbe {
    async fn probe(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                // dropping the response discards the body and frees the connection
                drop(response);
                debug!("{} answered {}", self.url, status);
                status == StatusCode::OK
            }
            Err(e) => {
                debug!("{} not reachable: {}", self.url, e);
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Ready,
    TimedOut,
}

/// Summary of a session that reached `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub probes: u32,
    pub wake_sent: bool,
    pub elapsed: Duration,
}

/// A zero timeout expires before the first probe.
fn expired(elapsed: Duration, timeout: Duration) -> bool {
    timeout.is_zero() || elapsed > timeout
}

pub struct PollSession<'a, P, W, C> {
    config: &'a CallbackConfig,
    probe: &'a P,
    sender: &'a W,
    clock: &'a C,
    start: Instant,
    wake_sent: bool,
    probes: u32,
    state: PollState,
}

impl<'a, P, W, C> PollSession<'a, P, W, C>
where
    P: ReadinessProbe,
    W: WolSender,
    C: Clock,
{
    pub fn new(config: &'a CallbackConfig, probe: &'a P, sender: &'a W, clock: &'a C) -> Self {
        Self {
            config,
            probe,
            sender,
            clock,
            start: clock.now(),
            wake_sent: false,
            probes: 0,
            state: PollState::Polling,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn wake_sent(&self) -> bool {
        self.wake_sent
    }

    fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// Run one iteration of the loop. Terminal states are sticky.
    pub async fn step(&mut self) -> Result<PollState, CallbackError> {
        if self.state != PollState::Polling {
            return Ok(self.state);
        }

        if expired(self.elapsed(), self.config.timeout.get()) {
            self.state = PollState::TimedOut;
            return Ok(self.state);
        }

        self.probes += 1;
        if self.probe.probe().await {
            self.state = PollState::Ready;
            return Ok(self.state);
        }

        if !self.wake_sent {
            // guards the attempt, a failed send aborts the run anyway
            self.wake_sent = true;
            WakeEmitter::new(self.sender, &self.config.mac, &self.config.local, &self.config.remote)
                .wake()
                .await?;
        }

        debug!("{} not ready, next probe in {}", self.config.server, self.config.delay);
        self.clock.sleep(self.config.delay.get()).await;
        Ok(self.state)
    }

    /// Poll until ready. Timing out is an error.
    pub async fn run(mut self) -> Result<PollReport, CallbackError> {
        loop {
            match self.step().await? {
                PollState::Polling => continue,
                PollState::Ready => {
                    let report = PollReport {
                        probes: self.probes,
                        wake_sent: self.wake_sent,
                        elapsed: self.elapsed(),
                    };
                    info!("server ready after {} probe(s)", report.probes);
                    return Ok(report);
                }
                PollState::TimedOut => {
                    return Err(CallbackError::TimedOut {
                        server: self.config.server.clone(),
                        elapsed: self.elapsed(),
                    })
                }
            }
        }
    }
}
