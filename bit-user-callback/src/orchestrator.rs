//! Callback run: gate, then network check, then wake-and-poll.

use crate::config::CallbackConfig;
use crate::discovery::{check_presence, EssidScanner, IwconfigScanner, Presence};
use crate::error::CallbackError;
use crate::gate::Invocation;
use crate::readiness::{Clock, HttpProbe, PollReport, PollSession, ReadinessProbe, SystemClock};
use crate::wol::{UdpWolSender, WolSender};
use tracing::{debug, info};

/// Non-fatal end of a run. All of them exit with status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Wrong profile or reason, nothing to do.
    NotApplicable,
    /// Not on the configured network.
    NotPresent { essid: String },
    Ready(PollReport),
}

pub struct Orchestrator<S, P, W, C> {
    config: CallbackConfig,
    scanner: S,
    probe: P,
    sender: W,
    clock: C,
}

impl Orchestrator<IwconfigScanner, HttpProbe, UdpWolSender, SystemClock> {
    /// Wire the real collaborators for `config`.
    pub fn from_config(config: CallbackConfig) -> Result<Self, CallbackError> {
        let scanner = IwconfigScanner::new(&config.iwconfig_path);
        let probe = HttpProbe::new(&config.server)?;
        Ok(Self::new(config, scanner, probe, UdpWolSender, SystemClock))
    }
}

impl<S, P, W, C> Orchestrator<S, P, W, C>
where
    S: EssidScanner,
    P: ReadinessProbe,
    W: WolSender,
    C: Clock,
{
    pub fn new(config: CallbackConfig, scanner: S, probe: P, sender: W, clock: C) -> Self {
        Self { config, scanner, probe, sender, clock }
    }

    pub fn config(&self) -> &CallbackConfig {
        &self.config
    }

    pub async fn run(&self, invocation: &Invocation) -> Result<Outcome, CallbackError> {
        if !invocation.is_applicable(&self.config) {
            debug!(
                "ignoring profile {:?} with reason {}",
                invocation.profile_name, invocation.reason
            );
            return Ok(Outcome::NotApplicable);
        }

        let essid = &self.config.essid;
        let presence = check_presence(&self.scanner, essid)
            .await
            .map_err(CallbackError::PresenceCheckFailed)?;
        if presence == Presence::NotConnected {
            info!("not connected to {:?}", essid);
            return Ok(Outcome::NotPresent { essid: essid.clone() });
        }

        info!("connected to {:?}, waiting for {}", essid, self.config.server);
        let report = PollSession::new(&self.config, &self.probe, &self.sender, &self.clock)
            .run()
            .await?;
        Ok(Outcome::Ready(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::HumanDuration;
    use crate::testing::{ManualClock, RecordingSender, ScriptedProbe, StaticScanner};

    fn config() -> CallbackConfig {
        CallbackConfig {
            profile: "Main".into(),
            essid: "HomeNet".into(),
            server: "http://backup.lan/ready".into(),
            mac: "00:11:22:33:44:55".into(),
            remote: "127.0.0.1:9".into(),
            delay: HumanDuration::from_secs(20),
            timeout: HumanDuration::from_secs(600),
            ..CallbackConfig::default()
        }
    }

    fn invocation(profile: &str, reason: &str) -> Invocation {
        let args = vec!["1".to_string(), profile.to_string(), reason.to_string()];
        Invocation::from_args(&args).unwrap()
    }

    fn orchestrator(
        scanner: StaticScanner,
        answers: &[bool],
    ) -> Orchestrator<StaticScanner, ScriptedProbe, RecordingSender, ManualClock> {
        Orchestrator::new(
            config(),
            scanner,
            ScriptedProbe::new(answers.iter().copied()),
            RecordingSender::default(),
            ManualClock::new(),
        )
    }

    #[tokio::test]
    async fn test_closed_gate_does_nothing() {
        // a scan would fail, so reaching it would surface as an error
        let orch = orchestrator(StaticScanner(None), &[]);

        assert_eq!(orch.run(&invocation("Main", "1")).await.unwrap(), Outcome::NotApplicable);
        assert_eq!(orch.run(&invocation("Other", "7")).await.unwrap(), Outcome::NotApplicable);
        assert_eq!(orch.probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_absent_network_is_quiet_exit() {
        let orch = orchestrator(StaticScanner(Some(vec!["Office", "Guest"])), &[true]);

        let outcome = orch.run(&invocation("Main", "7")).await.unwrap();

        assert_eq!(outcome, Outcome::NotPresent { essid: "HomeNet".into() });
        assert_eq!(orch.probe.calls(), 0);
        assert_eq!(orch.sender.sent(), 0);
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal() {
        let orch = orchestrator(StaticScanner(None), &[true]);

        let err = orch.run(&invocation("Main", "7")).await.unwrap_err();

        assert!(matches!(err, CallbackError::PresenceCheckFailed(_)));
        assert_eq!(orch.probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_wakes_and_waits_until_ready() {
        let orch = orchestrator(StaticScanner(Some(vec!["HomeNet", "Guest"])), &[false, false, true]);

        let outcome = orch.run(&invocation("Main", "7")).await.unwrap();

        match outcome {
            Outcome::Ready(report) => {
                assert_eq!(report.probes, 3);
                assert!(report.wake_sent);
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(orch.sender.sent(), 1);
        assert_eq!(orch.clock.sleeps(), 2);
    }
}
