use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::frame::Frame;
use crate::store::{Store, StoreError};
use crate::Error;

/// Per-connection state: the auth gate and the MULTI/EXEC controller. Each
/// RESP connection (or in-process caller) owns one; nothing here is shared.
pub struct Session {
    store: Store,
    password: Option<String>,
    authenticated: bool,
    // Some while buffering between MULTI and EXEC.
    queued: Option<Vec<Command>>,
}

impl Session {
    pub fn new(store: Store, password: Option<String>) -> Session {
        Session {
            store,
            password,
            authenticated: false,
            queued: None,
        }
    }

    /// Routes one command: auth gate first, then transaction control, then
    /// execution. Client-level failures come back as error frames; only
    /// transport or SQL failures surface as `Err`.
    pub async fn apply(&mut self, cmd: Command) -> Result<Frame, Error> {
        // AUTH is the one command exempt from the gate below.
        let cmd = match cmd {
            Command::Auth(auth) => return Ok(self.auth(&auth.password)),
            cmd => cmd,
        };

        if self.password.is_some() && !self.authenticated {
            return Ok(Frame::Error("NOAUTH Authentication required.".to_string()));
        }

        match cmd {
            Command::Multi => Ok(self.multi()),
            Command::Exec => Ok(self.exec()),
            Command::Discard => Ok(self.discard()),
            // WATCH is a deliberate no-op: EXEC runs under a real SQL
            // transaction, which is stronger isolation than the optimistic
            // key-watch it replaces.
            Command::Watch | Command::Unwatch => Ok(Frame::Simple("OK".to_string())),
            Command::Quit => Ok(Frame::Simple("OK".to_string())),
            cmd => {
                if let Some(queue) = self.queued.as_mut() {
                    queue.push(cmd);
                    return Ok(Frame::Simple("QUEUED".to_string()));
                }

                match cmd {
                    Command::Brpoplpush(cmd) => cmd.exec_blocking(&self.store).await,
                    cmd => self.run(cmd),
                }
            }
        }
    }

    fn run(&self, cmd: Command) -> Result<Frame, Error> {
        reply_or_raise(self.store.with_tx(|tx| cmd.exec(tx)))
    }

    fn multi(&mut self) -> Frame {
        if self.queued.is_some() {
            return Frame::Error("ERR MULTI calls can not be nested".to_string());
        }
        self.queued = Some(Vec::new());
        Frame::Simple("OK".to_string())
    }

    fn discard(&mut self) -> Frame {
        match self.queued.take() {
            Some(_) => Frame::Simple("OK".to_string()),
            None => Frame::Error("ERR DISCARD without MULTI".to_string()),
        }
    }

    /// Drains the buffer inside one SQL transaction. A per-command WRONGTYPE
    /// lands in that command's result slot and the batch continues; an SQL
    /// failure rolls the whole batch back and reports a single error.
    fn exec(&mut self) -> Frame {
        let Some(queued) = self.queued.take() else {
            return Frame::Error("ERR EXEC without MULTI".to_string());
        };

        let result: Result<Vec<Frame>, Error> = self.store.with_tx(|tx| {
            let mut replies = Vec::with_capacity(queued.len());

            for cmd in queued {
                match cmd.exec(tx) {
                    Ok(frame) => replies.push(frame),
                    Err(err) => match err.downcast::<StoreError>() {
                        Ok(store_err) if store_err.is_client_error() => {
                            replies.push(Frame::Error(store_err.to_string()))
                        }
                        Ok(store_err) => return Err(store_err as Error),
                        Err(err) => return Err(err),
                    },
                }
            }

            Ok(replies)
        });

        match result {
            Ok(replies) => Frame::Array(replies),
            // Rolled back by the transaction scope.
            Err(err) => Frame::Error(format!("ERR transaction aborted: {}", err)),
        }
    }

    fn auth(&mut self, password: &str) -> Frame {
        match &self.password {
            None => Frame::Error("ERR Client sent AUTH, but no password is set".to_string()),
            Some(configured) if configured == password => {
                self.authenticated = true;
                Frame::Simple("OK".to_string())
            }
            Some(_) => Frame::Error("ERR invalid password".to_string()),
        }
    }
}

fn reply_or_raise(result: Result<Frame, Error>) -> Result<Frame, Error> {
    match result {
        Ok(frame) => Ok(frame),
        Err(err) => match err.downcast::<StoreError>() {
            Ok(store_err) if store_err.is_client_error() => {
                Ok(Frame::Error(store_err.to_string()))
            }
            Ok(store_err) => Err(store_err),
            Err(err) => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::store::Store;

    fn command(parts: &[&str]) -> Command {
        let frames = parts
            .iter()
            .map(|part| Frame::Bulk(Bytes::from(part.to_string())))
            .collect();
        Command::try_from(Frame::Array(frames)).unwrap()
    }

    #[tokio::test]
    async fn multi_queues_until_exec() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store.clone(), None);

        let ok = session.apply(command(&["MULTI"])).await.unwrap();
        assert_eq!(ok, Frame::Simple("OK".to_string()));

        let queued = session
            .apply(command(&["SET", "foo", "bar"]))
            .await
            .unwrap();
        assert_eq!(queued, Frame::Simple("QUEUED".to_string()));

        // Buffered effects are not observable before EXEC.
        assert_eq!(store.get("foo").unwrap(), None);

        let replies = session.apply(command(&["EXEC"])).await.unwrap();
        assert_eq!(
            replies,
            Frame::Array(vec![Frame::Simple("OK".to_string())])
        );

        assert_eq!(store.get("foo").unwrap(), Some(Bytes::from("bar")));
    }

    #[tokio::test]
    async fn exec_captures_wrongtype_per_slot_and_continues() {
        let store = Store::open_in_memory().unwrap();
        store.set("foo", b"bar").unwrap();

        let mut session = Session::new(store.clone(), None);

        session.apply(command(&["MULTI"])).await.unwrap();
        session.apply(command(&["SET", "foo", "bar"])).await.unwrap();
        session
            .apply(command(&["LPUSH", "foo", "abc"]))
            .await
            .unwrap();
        session.apply(command(&["GET", "foo"])).await.unwrap();

        let replies = session.apply(command(&["EXEC"])).await.unwrap();

        let Frame::Array(replies) = replies else {
            panic!("expected array reply, got {:?}", replies)
        };
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], Frame::Simple("OK".to_string()));
        assert!(matches!(
            &replies[1],
            Frame::Error(message) if message.starts_with("WRONGTYPE")
        ));
        assert_eq!(replies[2], Frame::Bulk(Bytes::from("bar")));
    }

    #[tokio::test]
    async fn exec_with_empty_buffer_returns_empty_array() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, None);

        session.apply(command(&["MULTI"])).await.unwrap();
        let replies = session.apply(command(&["EXEC"])).await.unwrap();

        assert_eq!(replies, Frame::Array(vec![]));
    }

    #[tokio::test]
    async fn exec_without_multi_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, None);

        let reply = session.apply(command(&["EXEC"])).await.unwrap();
        assert_eq!(
            reply,
            Frame::Error("ERR EXEC without MULTI".to_string())
        );
    }

    #[tokio::test]
    async fn nested_multi_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, None);

        session.apply(command(&["MULTI"])).await.unwrap();
        let reply = session.apply(command(&["MULTI"])).await.unwrap();

        assert_eq!(
            reply,
            Frame::Error("ERR MULTI calls can not be nested".to_string())
        );
    }

    #[tokio::test]
    async fn discard_drops_the_buffer() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store.clone(), None);

        session.apply(command(&["MULTI"])).await.unwrap();
        session.apply(command(&["SET", "foo", "bar"])).await.unwrap();

        let reply = session.apply(command(&["DISCARD"])).await.unwrap();
        assert_eq!(reply, Frame::Simple("OK".to_string()));

        assert_eq!(store.get("foo").unwrap(), None);

        let reply = session.apply(command(&["DISCARD"])).await.unwrap();
        assert_eq!(
            reply,
            Frame::Error("ERR DISCARD without MULTI".to_string())
        );
    }

    #[tokio::test]
    async fn auth_gate_blocks_until_authenticated() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, Some("secret".to_string()));

        let reply = session.apply(command(&["GET", "k"])).await.unwrap();
        assert_eq!(
            reply,
            Frame::Error("NOAUTH Authentication required.".to_string())
        );

        let reply = session.apply(command(&["AUTH", "wrong"])).await.unwrap();
        assert_eq!(reply, Frame::Error("ERR invalid password".to_string()));

        let reply = session.apply(command(&["AUTH", "secret"])).await.unwrap();
        assert_eq!(reply, Frame::Simple("OK".to_string()));

        let reply = session.apply(command(&["GET", "k"])).await.unwrap();
        assert_eq!(reply, Frame::NullBulkString);
    }

    #[tokio::test]
    async fn quit_is_gated_until_authenticated() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, Some("secret".to_string()));

        let reply = session.apply(command(&["QUIT"])).await.unwrap();
        assert_eq!(
            reply,
            Frame::Error("NOAUTH Authentication required.".to_string())
        );

        session.apply(command(&["AUTH", "secret"])).await.unwrap();

        let reply = session.apply(command(&["QUIT"])).await.unwrap();
        assert_eq!(reply, Frame::Simple("OK".to_string()));
    }

    #[tokio::test]
    async fn auth_without_configured_password_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, None);

        let reply = session.apply(command(&["AUTH", "whatever"])).await.unwrap();
        assert_eq!(
            reply,
            Frame::Error("ERR Client sent AUTH, but no password is set".to_string())
        );
    }

    #[tokio::test]
    async fn watch_and_unwatch_are_accepted_noops() {
        let store = Store::open_in_memory().unwrap();
        let mut session = Session::new(store, None);

        for name in ["WATCH", "UNWATCH"] {
            let reply = session.apply(command(&[name])).await.unwrap();
            assert_eq!(reply, Frame::Simple("OK".to_string()));
        }
    }
}
