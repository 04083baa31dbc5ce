use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Inclusive range; negative indices count from the tail (-1 is the last
/// element).
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for Lrange {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let values = tx
            .lrange(&self.key, self.start, self.stop)?
            .into_iter()
            .map(Frame::Bulk)
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;
    use crate::store::Store;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .rpush(
                "list",
                &[Bytes::from("a"), Bytes::from("b"), Bytes::from("c")],
            )
            .unwrap();
        store
    }

    #[test]
    fn negative_indices_cover_whole_list() {
        let store = seeded_store();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LRANGE")),
            Frame::Bulk(Bytes::from("list")),
            Frame::Bulk(Bytes::from("-3")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();

        assert_eq!(
            res,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("a")),
                Frame::Bulk(Bytes::from("b")),
                Frame::Bulk(Bytes::from("c")),
            ])
        );
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = seeded_store();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LRANGE")),
            Frame::Bulk(Bytes::from("list")),
            Frame::Bulk(Bytes::from("2")),
            Frame::Bulk(Bytes::from("1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Array(vec![]));
    }

    #[test]
    fn missing_key_is_empty() {
        let store = Store::open_in_memory().unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("LRANGE")),
            Frame::Bulk(Bytes::from("nope")),
            Frame::Bulk(Bytes::from("0")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Array(vec![]));
    }
}
