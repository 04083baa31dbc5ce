use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::lpush::parse_values;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/srem
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: String,
    pub members: Vec<Bytes>,
}

impl Executable for Srem {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let removed = tx.srem(&self.key, &self.members)?;
        Ok(Frame::Integer(removed))
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parse_values(parser)?;
        Ok(Self { key, members })
    }
}
