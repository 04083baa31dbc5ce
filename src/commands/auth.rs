use crate::commands::CommandParser;
use crate::Error;

/// Credential check handled by the session layer, never against the store.
///
/// Ref: <https://redis.io/docs/latest/commands/auth/>
#[derive(Debug, PartialEq)]
pub struct Auth {
    pub password: String,
}

impl TryFrom<&mut CommandParser> for Auth {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let password = parser.next_string()?;
        Ok(Self { password })
    }
}
