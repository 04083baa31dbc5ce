use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

const INFO: &str = "# Server\r\nredis_version:7.2.4\r\nredis_mode:standalone\r\n\
                    \r\n# Replication\r\nrole:master\r\nconnected_slaves:0\r\n\
                    \r\n# Cluster\r\ncluster_enabled:0\r\n";

/// Static server section, enough for client libraries that probe INFO during
/// their handshake.
#[derive(Debug, PartialEq)]
pub struct Info;

impl Executable for Info {
    fn exec(self, _tx: &Tx) -> Result<Frame, Error> {
        Ok(Frame::Bulk(Bytes::from(INFO)))
    }
}

impl TryFrom<&mut CommandParser> for Info {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
