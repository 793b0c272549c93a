//! Lightweight actor runtime plus the conversation-context actor.
//!
//! [`actor`] is a small mailbox abstraction over tokio mpsc channels:
//! one task per actor, bounded queue, graceful stop. [`context`] builds
//! on it to give each conversation a single owner for its analysis
//! memory, so concurrent analyses against the same conversation cannot
//! interleave partial writes.

pub mod actor;
pub mod context;

pub use actor::{spawn_actor, Actor, ActorHandle, Addr, Context};
pub use context::{
    AnalyzedVideo, ChatContextData, ContextActor, ContextLimits, ContextMsg, ContextUpdate,
    VerdictRecord,
};
