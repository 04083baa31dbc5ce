use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Plain upsert. An existing live expiry is preserved; SET options (NX/XX/EX)
/// are not supported.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        tx.set(&self.key, &self.value)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::Store;

    #[test]
    fn set_then_get() {
        let store = Store::open_in_memory().unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("bar")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Simple("OK".to_string()));

        assert_eq!(store.get("foo").unwrap(), Some(Bytes::from("bar")));
    }

    #[test]
    fn set_against_list_key_is_wrongtype() {
        let store = Store::open_in_memory().unwrap();
        store.lpush("foo", &[Bytes::from("v")]).unwrap();

        let err = store.set("foo", b"bar").err().unwrap();
        assert!(err.to_string().starts_with("WRONGTYPE"));
    }
}
