use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// Returns the number of fields actually removed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for Hdel {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        let removed = tx.hdel(&self.key, &self.fields)?;
        Ok(Frame::Integer(removed))
    }
}

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let mut fields = vec![];

        loop {
            match parser.next_string() {
                Ok(field) => fields.push(field),
                Err(CommandParserError::EndOfStream) if !fields.is_empty() => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;
    use crate::store::Store;

    #[test]
    fn counts_only_deleted_fields() {
        let store = Store::open_in_memory().unwrap();
        store
            .hset(
                "h",
                &[
                    ("f1".to_string(), Bytes::from("a")),
                    ("f2".to_string(), Bytes::from("b")),
                ],
            )
            .unwrap();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HDEL")),
            Frame::Bulk(Bytes::from("h")),
            Frame::Bulk(Bytes::from("f1")),
            Frame::Bulk(Bytes::from("f2")),
            Frame::Bulk(Bytes::from("f3")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = store.with_tx(|tx| cmd.exec(tx)).unwrap();
        assert_eq!(res, Frame::Integer(2));

        assert_eq!(store.hget("h", "f1").unwrap(), None);
    }
}
