pub mod events;
pub mod http;
mod request;
pub mod resolver;
mod result;
mod runner;
mod types;

pub use events::{
    ChannelEventSink, CompositeEventSink, Event, EventSink, NoOpEventSink, RunStatus,
    StdoutEventSink, TracingEventSink,
};
pub use http::{HttpClient, HttpRequestParts, HttpResponseParts, ReqwestHttpClient, TransportError};
pub use request::{RequestExecutor, ResolvedRequest};
pub use resolver::{ExtractionError, ExtractionErrorKind, VariableResolver, PARAMS_SCOPE};
pub use result::{RunError, RunSummary};
pub use runner::{spawn_sequence, RunOutcome, SequenceRunner};
pub use types::ExecutorConfig;
