use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::hset::parse_entries;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Same upsert as HSET but replies OK instead of the new-field count.
///
/// Ref: <https://redis.io/docs/latest/commands/hmset/>
#[derive(Debug, PartialEq)]
pub struct Hmset {
    pub key: String,
    pub entries: Vec<(String, Bytes)>,
}

impl Executable for Hmset {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        tx.hset(&self.key, &self.entries)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Hmset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let entries = parse_entries(parser)?;
        Ok(Self { key, entries })
    }
}
