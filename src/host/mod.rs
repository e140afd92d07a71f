//! Line-delimited JSON bridge for the native host shell.

pub mod contract;
pub mod speech;
pub mod stdio;

pub use contract::{CommandEnvelope, EventEnvelope, HostCommand, HostEvent, RecognizerControl};
pub use speech::HostSpeechInput;
pub use stdio::{HostBridge, run_bridge, run_stdio_bridge};
