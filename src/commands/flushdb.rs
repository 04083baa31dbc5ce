use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Truncates all four stores. With a single logical database, FLUSHDB and
/// FLUSHALL are the same operation.
///
/// Ref: <https://redis.io/docs/latest/commands/flushdb/>
#[derive(Debug, PartialEq)]
pub struct Flushdb;

impl Executable for Flushdb {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        tx.flush_all()?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Flushdb {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
