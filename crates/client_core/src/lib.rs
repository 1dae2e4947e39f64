//! Client-side orchestration for the sequence toolbox backend.

pub mod availability;
pub mod composition;
pub mod config;
pub mod gateway;
pub mod generation;
pub mod invocation;
pub mod session;
pub mod stats_pipeline;
pub mod tools;

pub use availability::{Availability, AvailabilityMonitor, MonitorOptions};
pub use composition::{analyze_composition, CompositionShare, StatsSummary};
pub use config::{load_settings, ClientSettings};
pub use gateway::{GatewayError, HttpGateway, SequenceGateway, TransformOperation};
pub use invocation::{InvocationPhase, SessionState};
pub use session::{
    ClipboardSink, MissingClipboard, Session, SessionCommand, SessionError, SessionHandle,
    SessionSnapshot,
};
pub use tools::{registry, ToolDescriptor};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
