//! The interview loop: status machine, silence detection, turn controller.

pub mod controller;
pub mod detector;
pub mod status;

pub use controller::{
    CollectorSink, ControlCommand, ControllerConfig, EventSink, InterviewEvent, InterviewOutcome,
    NullSink, TurnController,
};
pub use detector::{Clock, SilenceDetector, SilenceVerdict, SystemClock};
pub use status::{Status, StatusCell};
