use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Prepends values; the last argument ends up at the head. Returns the new
/// list length.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct Lpush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for Lpush {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let len = tx.lpush(&self.key, &self.values)?;
        Ok(Frame::Integer(len))
    }
}

impl TryFrom<&mut CommandParser> for Lpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parse_values(parser)?;
        Ok(Self { key, values })
    }
}

/// At least one value, then as many as were sent.
pub(crate) fn parse_values(parser: &mut CommandParser) -> Result<Vec<Bytes>, Error> {
    let mut values = vec![];

    loop {
        match parser.next_bytes() {
            Ok(value) => values.push(value),
            Err(CommandParserError::EndOfStream) if !values.is_empty() => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(values)
}
