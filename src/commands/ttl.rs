use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Remaining time to live in seconds, rounded up; -2 when the key does not
/// exist, -1 when it has no expiry.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
}

impl Executable for Ttl {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let ttl = tx.ttl(&self.key)?;
        Ok(Frame::Integer(ttl))
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

/// Millisecond-precision variant.
#[derive(Debug, PartialEq)]
pub struct Pttl {
    pub key: String,
}

impl Executable for Pttl {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let pttl = tx.pttl(&self.key)?;
        Ok(Frame::Integer(pttl))
    }
}

impl TryFrom<&mut CommandParser> for Pttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
