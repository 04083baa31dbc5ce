use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/rpop
#[derive(Debug, PartialEq)]
pub struct Rpop {
    pub key: String,
}

impl Executable for Rpop {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        match tx.rpop(&self.key)? {
            Some(value) => Ok(Frame::Bulk(value)),
            None => Ok(Frame::NullBulkString),
        }
    }
}

impl TryFrom<&mut CommandParser> for Rpop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
