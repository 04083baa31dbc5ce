use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

// https://redis.io/commands/flushall
#[derive(Debug, PartialEq)]
pub struct Flushall;

impl Executable for Flushall {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        tx.flush_all()?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Flushall {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
