use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/sismember
#[derive(Debug, PartialEq)]
pub struct Sismember {
    pub key: String,
    pub member: Bytes,
}

impl Executable for Sismember {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let present = tx.sismember(&self.key, &self.member)?;
        Ok(Frame::Integer(i64::from(present)))
    }
}

impl TryFrom<&mut CommandParser> for Sismember {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_bytes()?;

        Ok(Self { key, member })
    }
}
