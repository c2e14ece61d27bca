//! Session orchestration modules.
//!
//! Covers the completion monitor and the clock it polls on.

pub mod clock;
pub mod monitor;

pub use clock::{Clock, ManualClock, TokioClock};
pub use monitor::{Completion, CompletionMonitor, CompletionSignal, MonitorEvent, MonitorOptions};
