use std::{
    error::Error,
    fmt::Display,
    io::{self},
};

/// Errors that may occur when reading a request from a stream.
#[derive(Debug)]
pub enum ReadError {
    IoError(io::Error),
    /// The line parsed but matched no known command. The server answers
    /// these with `unknown command\n` instead of dropping the connection.
    UnknownCommand(String),
    /// No newline arrived within the command length limit.
    CommandTooLong(usize),
    /// The peer closed the connection at a command boundary or mid-line.
    Disconnected,
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        ReadError::IoError(value)
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::IoError(error) => write!(f, "{}", error),
            ReadError::UnknownCommand(cmd) => write!(f, "Received unknown command {:?}", cmd),
            ReadError::CommandTooLong(got) => {
                write!(f, "No newline within {} bytes of command data", got)
            }
            ReadError::Disconnected => write!(f, "Peer disconnected"),
        }
    }
}

impl Error for ReadError {}
