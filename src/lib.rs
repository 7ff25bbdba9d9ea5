//! voipready -- VoIP network readiness assessment.
//!
//! Measures a network path's fitness for real-time voice traffic
//! (packet loss, latency, jitter, hop count, DNS, public-IP
//! reachability) and classifies each measurement into PASS/WARN/FAIL
//! tiers, producing a one-shot report or a live latency stream.

pub mod classify;
pub mod diagnose;
pub mod extract;
pub mod monitor;
pub mod probes;
pub mod report;
pub mod verdict;
