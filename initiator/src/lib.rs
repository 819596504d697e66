#![deny(rust_2018_idioms)]

//! PTP-IP initiator: drives a network-attached responder (camera) over the
//! two TCP connections the protocol prescribes. The command-data connection
//! carries synchronous operation round-trips and data phases on the caller's
//! thread; the event connection is owned by a background reader that fans
//! asynchronous events out to registered listeners.
//!
//! The command-data API is single-writer: one operation in flight at a time,
//! and callers needing concurrent access must serialize externally.

mod engine;
mod error;
mod event;
mod transaction;

pub use engine::{Initiator, Response, ResponderInfo};
pub use error::InitiatorError;
pub use event::{CameraEvent, CameraEventListener};
pub use transaction::TransactionSequencer;
