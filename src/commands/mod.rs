pub mod auth;
pub mod brpoplpush;
pub mod dbsize;
pub mod del;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod flushall;
pub mod flushdb;
pub mod get;
pub mod hdel;
pub mod hget;
pub mod hmget;
pub mod hmset;
pub mod hset;
pub mod info;
pub mod keys;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod lrange;
pub mod mget;
pub mod ping;
pub mod rpop;
pub mod rpoplpush;
pub mod rpush;
pub mod sadd;
pub mod set;
pub mod sismember;
pub mod smembers;
pub mod srem;
pub mod ttl;
pub mod type_;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

use self::auth::Auth;
use self::brpoplpush::Brpoplpush;
use self::dbsize::DBSize;
use self::del::Del;
use self::exists::Exists;
use self::expire::Expire;
use self::flushall::Flushall;
use self::flushdb::Flushdb;
use self::get::Get;
use self::hdel::Hdel;
use self::hget::Hget;
use self::hmget::Hmget;
use self::hmset::Hmset;
use self::hset::Hset;
use self::info::Info;
use self::keys::Keys;
use self::llen::Llen;
use self::lpop::Lpop;
use self::lpush::Lpush;
use self::lrange::Lrange;
use self::mget::Mget;
use self::ping::Ping;
use self::rpop::Rpop;
use self::rpoplpush::Rpoplpush;
use self::rpush::Rpush;
use self::sadd::Sadd;
use self::set::Set;
use self::sismember::Sismember;
use self::smembers::Smembers;
use self::srem::Srem;
use self::ttl::{Pttl, Ttl};
use self::type_::Type;

#[derive(Debug, PartialEq)]
pub enum Command {
    Auth(Auth),
    Set(Set),
    Get(Get),
    Mget(Mget),
    Lpush(Lpush),
    Rpush(Rpush),
    Lpop(Lpop),
    Rpop(Rpop),
    Llen(Llen),
    Lrange(Lrange),
    Rpoplpush(Rpoplpush),
    Brpoplpush(Brpoplpush),
    Hset(Hset),
    Hmset(Hmset),
    Hget(Hget),
    Hmget(Hmget),
    Hdel(Hdel),
    Sadd(Sadd),
    Srem(Srem),
    Sismember(Sismember),
    Smembers(Smembers),
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    Ttl(Ttl),
    Pttl(Pttl),
    Type(Type),
    Keys(Keys),
    DBsize(DBSize),
    Flushdb(Flushdb),
    Flushall(Flushall),
    Info(Info),
    Ping(Ping),
    // Connection-state commands; the session layer handles these before any
    // transaction is opened.
    Multi,
    Exec,
    Discard,
    Watch,
    Unwatch,
    Quit,
}

impl Executable for Command {
    fn exec(self, tx: &Tx) -> Result<Frame, Error> {
        match self {
            Command::Set(cmd) => cmd.exec(tx),
            Command::Get(cmd) => cmd.exec(tx),
            Command::Mget(cmd) => cmd.exec(tx),
            Command::Lpush(cmd) => cmd.exec(tx),
            Command::Rpush(cmd) => cmd.exec(tx),
            Command::Lpop(cmd) => cmd.exec(tx),
            Command::Rpop(cmd) => cmd.exec(tx),
            Command::Llen(cmd) => cmd.exec(tx),
            Command::Lrange(cmd) => cmd.exec(tx),
            Command::Rpoplpush(cmd) => cmd.exec(tx),
            Command::Brpoplpush(cmd) => cmd.exec(tx),
            Command::Hset(cmd) => cmd.exec(tx),
            Command::Hmset(cmd) => cmd.exec(tx),
            Command::Hget(cmd) => cmd.exec(tx),
            Command::Hmget(cmd) => cmd.exec(tx),
            Command::Hdel(cmd) => cmd.exec(tx),
            Command::Sadd(cmd) => cmd.exec(tx),
            Command::Srem(cmd) => cmd.exec(tx),
            Command::Sismember(cmd) => cmd.exec(tx),
            Command::Smembers(cmd) => cmd.exec(tx),
            Command::Del(cmd) => cmd.exec(tx),
            Command::Exists(cmd) => cmd.exec(tx),
            Command::Expire(cmd) => cmd.exec(tx),
            Command::Ttl(cmd) => cmd.exec(tx),
            Command::Pttl(cmd) => cmd.exec(tx),
            Command::Type(cmd) => cmd.exec(tx),
            Command::Keys(cmd) => cmd.exec(tx),
            Command::DBsize(cmd) => cmd.exec(tx),
            Command::Flushdb(cmd) => cmd.exec(tx),
            Command::Flushall(cmd) => cmd.exec(tx),
            Command::Info(cmd) => cmd.exec(tx),
            Command::Ping(cmd) => cmd.exec(tx),
            Command::Auth(_)
            | Command::Multi
            | Command::Exec
            | Command::Discard
            | Command::Watch
            | Command::Unwatch
            | Command::Quit => Ok(Frame::Error(
                "ERR command is not allowed in transactions".to_string(),
            )),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the server as RESP arrays of bulk strings.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(Box::new(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                }))
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        match &command_name[..] {
            "auth" => Auth::try_from(parser).map(Command::Auth),
            "set" => Set::try_from(parser).map(Command::Set),
            "get" => Get::try_from(parser).map(Command::Get),
            "mget" => Mget::try_from(parser).map(Command::Mget),
            "lpush" => Lpush::try_from(parser).map(Command::Lpush),
            "rpush" => Rpush::try_from(parser).map(Command::Rpush),
            "lpop" => Lpop::try_from(parser).map(Command::Lpop),
            "rpop" => Rpop::try_from(parser).map(Command::Rpop),
            "llen" => Llen::try_from(parser).map(Command::Llen),
            "lrange" => Lrange::try_from(parser).map(Command::Lrange),
            "rpoplpush" => Rpoplpush::try_from(parser).map(Command::Rpoplpush),
            "brpoplpush" => Brpoplpush::try_from(parser).map(Command::Brpoplpush),
            "hset" => Hset::try_from(parser).map(Command::Hset),
            "hmset" => Hmset::try_from(parser).map(Command::Hmset),
            "hget" => Hget::try_from(parser).map(Command::Hget),
            "hmget" => Hmget::try_from(parser).map(Command::Hmget),
            "hdel" => Hdel::try_from(parser).map(Command::Hdel),
            "sadd" => Sadd::try_from(parser).map(Command::Sadd),
            "srem" => Srem::try_from(parser).map(Command::Srem),
            "sismember" => Sismember::try_from(parser).map(Command::Sismember),
            "smembers" => Smembers::try_from(parser).map(Command::Smembers),
            "del" => Del::try_from(parser).map(Command::Del),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "expire" => Expire::try_from(parser).map(Command::Expire),
            "ttl" => Ttl::try_from(parser).map(Command::Ttl),
            "pttl" => Pttl::try_from(parser).map(Command::Pttl),
            "type" => Type::try_from(parser).map(Command::Type),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "dbsize" => DBSize::try_from(parser).map(Command::DBsize),
            "flushdb" => Flushdb::try_from(parser).map(Command::Flushdb),
            "flushall" => Flushall::try_from(parser).map(Command::Flushall),
            "info" => Info::try_from(parser).map(Command::Info),
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "multi" => Ok(Command::Multi),
            "exec" => Ok(Command::Exec),
            "discard" => Ok(Command::Discard),
            "watch" => Ok(Command::Watch),
            "unwatch" => Ok(Command::Unwatch),
            "quit" => Ok(Command::Quit),
            name => Err(format!("unknown command {:?}", name).into()),
        }
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(s) => s
                .parse::<i64>()
                .map_err(|_| CommandParserError::InvalidInteger(s)),
            Frame::Bulk(bytes) => {
                let s = str::from_utf8(&bytes[..])
                    .map_err(CommandParserError::InvalidUTF8String)?
                    .to_string();
                s.parse::<i64>()
                    .map_err(|_| CommandParserError::InvalidInteger(s))
            }
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; invalid integer argument {0:?}")]
    InvalidInteger(String),
    #[error("invalid argument {argument:?} for command {command}")]
    InvalidCommandArgument { command: String, argument: String },
    #[error("wrong number of arguments")]
    EndOfStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get_command_with_simple_string() {
        let get_frame = Frame::Array(vec![
            Frame::Simple(String::from("GET")),
            Frame::Simple(String::from("foo")),
        ]);

        let get_command = Command::try_from(get_frame).unwrap();

        assert_eq!(
            get_command,
            Command::Get(Get {
                key: String::from("foo")
            })
        );
    }

    #[test]
    fn parse_command_name_case_insensitive() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GeT")),
            Frame::Bulk(Bytes::from("foo")),
        ]);

        let command = Command::try_from(frame).unwrap();

        assert_eq!(
            command,
            Command::Get(Get {
                key: String::from("foo")
            })
        );
    }

    #[test]
    fn parse_set_command() {
        let set_frame = Frame::Array(vec![
            Frame::Simple(String::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("baz")),
        ]);

        let set_command = Command::try_from(set_frame).unwrap();

        assert_eq!(
            set_command,
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("baz")
            })
        );
    }

    #[test]
    fn parse_control_commands() {
        for (name, expected) in [
            ("MULTI", Command::Multi),
            ("EXEC", Command::Exec),
            ("DISCARD", Command::Discard),
            ("WATCH", Command::Watch),
            ("UNWATCH", Command::Unwatch),
            ("QUIT", Command::Quit),
        ] {
            let frame = Frame::Array(vec![Frame::Bulk(Bytes::from(name))]);
            assert_eq!(Command::try_from(frame).unwrap(), expected);
        }
    }

    #[test]
    fn parse_unknown_command() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("SUBSCRIBE"))]);
        let err = Command::try_from(frame).err().unwrap();

        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn parse_non_array_frame() {
        let frame = Frame::Simple(String::from("GET"));
        let err = Command::try_from(frame).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert!(matches!(err, CommandParserError::InvalidFrame { .. }));
    }
}
