use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Atomically pops the tail of `source` and pushes it onto the head of
/// `destination` within one transaction.
///
/// Ref: <https://redis.io/docs/latest/commands/rpoplpush/>
#[derive(Debug, PartialEq)]
pub struct Rpoplpush {
    pub source: String,
    pub destination: String,
}

impl Executable for Rpoplpush {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        match tx.rpoplpush(&self.source, &self.destination)? {
            Some(value) => Ok(Frame::Bulk(value)),
            None => Ok(Frame::NullBulkString),
        }
    }
}

impl TryFrom<&mut CommandParser> for Rpoplpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_string()?;
        let destination = parser.next_string()?;

        Ok(Self {
            source,
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;
    use crate::store::Store;

    #[test]
    fn moves_exactly_one_element() {
        let store = Store::open_in_memory().unwrap();
        store
            .rpush(
                "src",
                &[Bytes::from("a"), Bytes::from("b"), Bytes::from("c")],
            )
            .unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("RPOPLPUSH")),
            Frame::Bulk(Bytes::from("src")),
            Frame::Bulk(Bytes::from("dst")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Bulk(Bytes::from("c")));

        assert_eq!(
            store.lrange("src", 0, -1).unwrap(),
            vec![Bytes::from("a"), Bytes::from("b")]
        );
        assert_eq!(store.lrange("dst", 0, -1).unwrap(), vec![Bytes::from("c")]);
    }

    #[test]
    fn empty_source_is_nil() {
        let store = Store::open_in_memory().unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("RPOPLPUSH")),
            Frame::Bulk(Bytes::from("src")),
            Frame::Bulk(Bytes::from("dst")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::NullBulkString);
    }
}
