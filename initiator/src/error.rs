use common::{constants::rsp, messages::Error as MessageError};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum InitiatorError {
    /// Transport fault on either connection, passed through unwrapped.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Codec or framing fault; the connection is desynchronized.
    #[error("message error: {0}")]
    Message(#[from] MessageError),
    /// The responder sent a packet type the protocol does not permit here.
    /// Fatal: the initiator must be discarded and rebuilt.
    #[error("expected {expected} but the responder sent {actual}")]
    UnexpectedPacket {
        expected: &'static str,
        actual: &'static str,
    },
    /// The init exchange did not produce the expected ack.
    #[error("handshake failed: expected {expected} but the responder sent {actual}")]
    Handshake {
        expected: &'static str,
        actual: &'static str,
    },
    /// The responder answered the init exchange with InitFail.
    #[error("responder rejected the connection: reason {reason:#010x}")]
    HandshakeRejected { reason: u32 },
    /// A well-formed response whose code is not Ok. Expected and recoverable;
    /// not a protocol fault.
    #[error("operation failed with response code {code:#06x} ({})", rsp::name(*.code).unwrap_or("vendor-defined"))]
    Operation { code: u16 },
    #[error("session id 0 is reserved for \"no session\"")]
    InvalidSessionId,
    #[error("operations take at most 5 parameters, got {0}")]
    TooManyParameters(usize),
    #[error("initiator is closed")]
    Closed,
}

impl InitiatorError {
    /// The wire response code, when the failure was a non-Ok response.
    pub fn response_code(&self) -> Option<u16> {
        match self {
            Self::Operation { code } => Some(*code),
            _ => None,
        }
    }
}
