//! Wire protocol: length-prefixed frames carrying JSON records.

pub mod frame;
mod message;
mod reassembler;

pub use self::frame::{FrameError, LENGTH_PREFIX_LEN, MAX_BODY_LEN, encode};
pub use self::message::{InboundMessage, MessageError, OutboundMessage};
pub use self::reassembler::{Feed, Reassembler};
