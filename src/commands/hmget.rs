use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// One result slot per requested field, preserving argument order.
///
/// Ref: <https://redis.io/docs/latest/commands/hmget/>
#[derive(Debug, PartialEq)]
pub struct Hmget {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for Hmget {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let values = tx
            .hmget(&self.key, &self.fields)?
            .into_iter()
            .map(|value| value.map(Frame::Bulk).unwrap_or(Frame::NullBulkString))
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Hmget {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let mut fields = vec![];

        loop {
            match parser.next_string() {
                Ok(field) => fields.push(field),
                Err(CommandParserError::EndOfStream) if !fields.is_empty() => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self { key, fields })
    }
}
