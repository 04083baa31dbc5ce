use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::lpush::parse_values;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/rpush
#[derive(Debug, PartialEq)]
pub struct Rpush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for Rpush {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let len = tx.rpush(&self.key, &self.values)?;
        Ok(Frame::Integer(len))
    }
}

impl TryFrom<&mut CommandParser> for Rpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parse_values(parser)?;
        Ok(Self { key, values })
    }
}
