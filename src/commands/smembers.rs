use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// All live members, ascending.
///
/// Ref: <https://redis.io/docs/latest/commands/smembers/>
#[derive(Debug, PartialEq)]
pub struct Smembers {
    pub key: String,
}

impl Executable for Smembers {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let members = tx
            .smembers(&self.key)?
            .into_iter()
            .map(Frame::Bulk)
            .collect();

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for Smembers {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
