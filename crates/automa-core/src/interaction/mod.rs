//! Human-in-the-loop interaction protocol
//!
//! Workers that need externally supplied input raise an [`Event`]. The event
//! is answered either in-process by a registered handler (synchronous mode)
//! or across a persistence boundary via suspend and resume (asynchronous
//! mode). Both modes share the same [`Event`] and [`Feedback`] shapes.

mod event;
mod handler;
mod record;

pub use event::{ApprovalDecision, Event, Feedback, InteractionFeedback};
pub use handler::{EventHandler, FeedbackSender, HandlerRegistry, InteractionError};
pub use record::InteractionRecord;
