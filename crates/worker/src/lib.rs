//! Background task primitives shared by the session engine.
//!
//! * [`spawn`] routes named tasks onto the active tokio runtime, or a lazily
//!   built fallback runtime outside one.
//! * [`GenerationClock`] / [`GenerationToken`] give every restartable task a
//!   monotonically increasing identity plus a cancellation handle.
//! * [`sleep_or_cancel`] is a timed wait that returns early on cancellation.
//! * [`ExclusiveGate`] is a single-slot gate whose acquisition can be
//!   abandoned on cancellation and which can be closed for teardown.

mod gate;
mod spawn;
mod token;
mod wait;

pub use gate::{ExclusiveGate, GateAcquire, GatePermit};
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};
pub use wait::{WaitOutcome, sleep_or_cancel};
