use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/ping
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub message: Option<Bytes>,
}

impl Executable for Ping {
    fn exec(self, _tx: &Tx) -> Result<Frame, Error> {
        match self.message {
            Some(message) => Ok(Frame::Bulk(message)),
            None => Ok(Frame::Simple("PONG".to_string())),
        }
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let message = match parser.next_bytes() {
            Ok(message) => Some(message),
            Err(CommandParserError::EndOfStream) => None,
            Err(err) => return Err(err.into()),
        };

        Ok(Self { message })
    }
}
