use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Store, Tx};
use crate::Error;

/// Blocking RPOPLPUSH. Suspends on an empty source until another connection
/// pushes to it or the timeout elapses; a timeout of 0 waits forever.
///
/// Ref: <https://redis.io/docs/latest/commands/brpoplpush/>
#[derive(Debug, PartialEq)]
pub struct Brpoplpush {
    pub source: String,
    pub destination: String,
    pub timeout_secs: f64,
}

impl Brpoplpush {
    /// The normal, connection-level path: parks on the blocking coordinator
    /// between attempts.
    pub async fn exec_blocking(self, store: &Store) -> Result<Frame, Error> {
        match store
            .brpoplpush(&self.source, &self.destination, self.timeout_secs)
            .await
        {
            Ok(Some(value)) => Ok(Frame::Bulk(value)),
            Ok(None) => Ok(Frame::NullBulkString),
            Err(err) if err.is_client_error() => Ok(Frame::Error(err.to_string())),
            Err(err) => Err(err.into()),
        }
    }
}

impl Executable for Brpoplpush {
    // Queued inside MULTI there is nothing to wait on; the command degrades
    // to a plain RPOPLPUSH, as Redis does.
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        match tx.rpoplpush(&self.source, &self.destination)? {
            Some(value) => Ok(Frame::Bulk(value)),
            None => Ok(Frame::NullBulkString),
        }
    }
}

impl TryFrom<&mut CommandParser> for Brpoplpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_string()?;
        let destination = parser.next_string()?;

        let timeout = parser.next_string()?;
        let timeout_secs = timeout.parse::<f64>().map_err(|_| {
            CommandParserError::InvalidCommandArgument {
                command: "BRPOPLPUSH".to_string(),
                argument: timeout,
            }
        })?;

        Ok(Self {
            source,
            destination,
            timeout_secs,
        })
    }
}
