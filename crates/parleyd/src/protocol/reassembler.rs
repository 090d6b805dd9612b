//! Streaming decoder that turns arbitrary socket reads into complete bodies.

use super::frame::{FrameError, LENGTH_PREFIX_LEN, parse_prefix};

#[derive(Debug)]
enum State {
    /// Collecting prefix digits; holds at most [`LENGTH_PREFIX_LEN`] bytes.
    AwaitingLength(Vec<u8>),
    /// Collecting body bytes; `buffer.len() < declared` while in this state.
    AwaitingBody { declared: usize, buffer: Vec<u8> },
    /// A framing error occurred; the stream cannot be resynchronised.
    Poisoned(FrameError),
}

impl Default for State {
    fn default() -> Self {
        Self::AwaitingLength(Vec::with_capacity(LENGTH_PREFIX_LEN))
    }
}

/// Outcome of feeding one chunk to a [`Reassembler`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Bodies completed by the chunk, in stream order.
    pub bodies: Vec<Vec<u8>>,
    /// Framing error hit after `bodies`; decoding stops there.
    pub error: Option<FrameError>,
}

impl Feed {
    /// Bodies when the chunk framed cleanly.
    ///
    /// # Errors
    ///
    /// Returns the framing error, dropping any bodies completed before it.
    pub fn into_result(self) -> Result<Vec<Vec<u8>>, FrameError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.bodies),
        }
    }
}

/// Per-connection frame reassembler.
///
/// Bodies may be split across reads at any byte, including inside the length
/// prefix, and one read may carry several bodies. State survives between calls
/// to [`Reassembler::feed`].
#[derive(Debug, Default)]
pub struct Reassembler {
    state: State,
}

impl Reassembler {
    /// Creates a reassembler waiting for the first length prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes `chunk` and returns every body it completes, in order.
    ///
    /// A prefix containing a non-digit stops decoding: the bodies completed
    /// before it are still returned, alongside
    /// [`FrameError::InvalidLengthPrefix`]. The reassembler is poisoned
    /// afterwards and reports the same error, with no bodies, for every later
    /// call.
    pub fn feed(&mut self, chunk: &[u8]) -> Feed {
        let mut complete = Vec::new();
        let mut rest = chunk;

        loop {
            match &mut self.state {
                State::Poisoned(error) => {
                    return Feed {
                        bodies: complete,
                        error: Some(error.clone()),
                    };
                }
                State::AwaitingLength(prefix) => {
                    let wanted = LENGTH_PREFIX_LEN - prefix.len();
                    let (head, tail) = rest.split_at(wanted.min(rest.len()));
                    prefix.extend_from_slice(head);
                    rest = tail;
                    if prefix.len() < LENGTH_PREFIX_LEN {
                        break;
                    }
                    let declared = match parse_prefix(prefix) {
                        Ok(declared) => declared,
                        Err(error) => {
                            self.state = State::Poisoned(error.clone());
                            return Feed {
                                bodies: complete,
                                error: Some(error),
                            };
                        }
                    };
                    if declared == 0 {
                        complete.push(Vec::new());
                        self.state = State::default();
                    } else {
                        self.state = State::AwaitingBody {
                            declared,
                            buffer: Vec::with_capacity(declared),
                        };
                    }
                }
                State::AwaitingBody { declared, buffer } => {
                    let wanted = *declared - buffer.len();
                    let (head, tail) = rest.split_at(wanted.min(rest.len()));
                    buffer.extend_from_slice(head);
                    rest = tail;
                    if buffer.len() < *declared {
                        break;
                    }
                    complete.push(std::mem::take(buffer));
                    self.state = State::default();
                }
            }
            if rest.is_empty() {
                break;
            }
        }

        Feed {
            bodies: complete,
            error: None,
        }
    }

    /// Returns `true` once a framing error has been seen.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Poisoned(_))
    }
}
