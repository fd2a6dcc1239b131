mod history;
mod method;
mod param;
mod sequence;
mod step;

pub use history::{HeaderPair, History, HistoryEntry};
pub use method::{HttpMethod, MethodError};
pub use param::Param;
pub use sequence::Sequence;
pub use step::{Header, Step, StepField};
