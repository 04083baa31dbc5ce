use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::lpush::parse_values;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Insert-or-ignore; the reply counts only members that were actually new.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct Sadd {
    pub key: String,
    pub members: Vec<Bytes>,
}

impl Executable for Sadd {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let added = tx.sadd(&self.key, &self.members)?;
        Ok(Frame::Integer(added))
    }
}

impl TryFrom<&mut CommandParser> for Sadd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parse_values(parser)?;
        Ok(Self { key, members })
    }
}
