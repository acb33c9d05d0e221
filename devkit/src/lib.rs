/*!
# wake-devkit - stubs for the user-callback collaborators

Lets the callback run end to end without a backup server, a wireless card or
a broadcast domain:
- Scripted HTTP readiness server
- UDP catcher recording wake packets
- Fake `iwconfig` executable
- Config document builder and test harness
*/

pub mod http_stub;
pub mod udp_stub;
pub mod iwconfig_stub;
pub mod test_utils;

pub use http_stub::StubServer;
pub use udp_stub::WolCatcher;
pub use iwconfig_stub::FakeIwconfig;
pub use test_utils::{ConfigBuilder, TestHarness};
