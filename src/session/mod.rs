pub mod controller;
pub mod input;
pub mod result;
pub mod timer;

pub use controller::{
    CommitOutcome, NullSink, PresentationSink, RecordPolicy, Session, SessionController,
    SessionSettings, SessionState,
};
pub use input::{CharStatus, CommitKey};
pub use result::{EndReason, SessionSummary};
