use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Sets an absolute expiry `seconds` from now on every row of the key's
/// owning store. 1 when applied, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/expire/>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: String,
    pub seconds: i64,
}

impl Executable for Expire {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let applied = tx.expire(&self.key, self.seconds)?;
        Ok(Frame::Integer(i64::from(applied)))
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let seconds = parser.next_integer()?;

        Ok(Self { key, seconds })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;
    use crate::store::Store;

    #[test]
    fn expire_applies_to_existing_key() {
        let store = Store::open_in_memory().unwrap();
        store.set("foo", b"bar").unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIRE")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("100")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Integer(1));

        let ttl = store.ttl("foo").unwrap();
        assert!(ttl > 0 && ttl <= 100);
    }

    #[test]
    fn expire_missing_key_returns_zero() {
        let store = Store::open_in_memory().unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIRE")),
            Frame::Bulk(Bytes::from("nope")),
            Frame::Bulk(Bytes::from("100")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Integer(0));
    }
}
