use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Upserts one or more field/value pairs; returns the number of fields that
/// were newly created (replacements do not count).
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: String,
    pub entries: Vec<(String, Bytes)>,
}

impl Executable for Hset {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let added = tx.hset(&self.key, &self.entries)?;
        Ok(Frame::Integer(added))
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let entries = parse_entries(parser)?;
        Ok(Self { key, entries })
    }
}

/// At least one field/value pair, and nothing dangling.
pub(crate) fn parse_entries(parser: &mut CommandParser) -> Result<Vec<(String, Bytes)>, Error> {
    let mut entries = vec![];

    loop {
        let field = match parser.next_string() {
            Ok(field) => field,
            Err(CommandParserError::EndOfStream) if !entries.is_empty() => break,
            Err(err) => return Err(err.into()),
        };
        let value = parser.next_bytes()?;
        entries.push((field, value));
    }

    Ok(entries)
}
