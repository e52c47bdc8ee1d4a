//! Session lifecycle: data model, pure transitions, and the runtime engine.
pub mod engine;
pub mod event;
pub mod reducer;
pub mod state;

pub use engine::{GenerationRecord, SessionEngine, SessionSnapshot, Step, Steps};
pub use event::{Action, ActionRejected, EventKind, SessionEvent};
pub use reducer::{Effect, Effects, ReduceContext, Transition, reduce};
pub use state::{Phase, SessionState};
