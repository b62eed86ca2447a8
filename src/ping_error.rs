use std::{error::Error, fmt, io};

pub type GenericError = Box<dyn Error + Send + Sync + 'static>;

pub type PingResult<T> = std::result::Result<T, PingError>;

#[derive(Debug)]
pub enum PingError {
    /// An echo request could not be serialized.
    Encoding(String),
    /// A received datagram is not a well-formed ICMP message.
    Decoding(String),
    /// The destination does not resolve to an IPv4 socket address.
    Resolution(String),
    Io(io::Error),
    /// The other end of an internal channel is gone.
    ChannelClosed,
}

impl PingError {
    /// Fatal errors terminate the ping loop, everything else is logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PingError::Encoding(_) | PingError::Resolution(_) | PingError::ChannelClosed)
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError")?;
        match self {
            PingError::Encoding(message) => write!(f, ": could not encode echo request: {message}"),
            PingError::Decoding(message) => write!(f, ": could not decode ICMP message: {message}"),
            PingError::Resolution(message) => write!(f, ": could not resolve destination: {message}"),
            PingError::Io(error) => write!(f, ": {error}"),
            PingError::ChannelClosed => write!(f, ": channel closed"),
        }
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PingError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for PingError {
    fn from(error: io::Error) -> PingError {
        PingError::Io(error)
    }
}

impl<T> From<std::sync::mpsc::SendError<T>> for PingError {
    fn from(_: std::sync::mpsc::SendError<T>) -> PingError {
        PingError::ChannelClosed
    }
}
