//! Order processing and the consumption loop.
//!
//! This crate carries the one subtle correctness property of the whole
//! system: the asymmetric offset-commit policy. Every polled message runs
//! the state machine Received -> Validated -> Processed -> Finalized, and
//! the finalize step distinguishes "will never succeed" (commit the offset
//! and move on) from "might succeed later" (withhold the commit and let the
//! queue redeliver):
//!
//! - `Applied` - stock decremented, sale recorded: commit
//! - `Rejected` - permanent business fault: commit, log as a dropped order
//! - `Malformed` - permanently unparseable payload: commit
//! - `Transient` - infrastructure fault: withhold, redeliver
//!
//! Committing too eagerly loses orders silently; withholding on a permanent
//! failure stalls the partition in an unbounded redelivery loop.

mod outcome;
mod processor;
mod run;


pub use outcome::{MessageOutcome, OffsetAction, Rejection};
pub use processor::{process, Outcome};
pub use run::{run_consumer_loop, Config};
