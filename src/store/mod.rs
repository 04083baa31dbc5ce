pub mod error;
pub mod schema;

mod hashes;
mod keyspace;
mod lists;
mod sets;
mod strings;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub use error::StoreError;
pub use schema::{Tables, DEFAULT_PREFIX, PREFIX_ENV_VAR};

/// The four stores a key may live in. A key belongs to at most one of them at
/// any time; writes against the wrong one fail with WRONGTYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Hash,
    List,
    Set,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::String, Kind::Hash, Kind::List, Kind::Set];

    fn table<'a>(&self, tables: &'a Tables) -> &'a str {
        match self {
            Kind::String => &tables.string,
            Kind::Hash => &tables.hash,
            Kind::List => &tables.list,
            Kind::Set => &tables.set,
        }
    }

    /// Type name as reported by the TYPE command.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Hash => "hash",
            Kind::List => "list",
            Kind::Set => "set",
        }
    }
}

struct Core {
    // SQLite is effectively single-writer; the mutex serializes all access so
    // a transaction never observes a second writer's BEGIN failing.
    conn: Mutex<Connection>,
    tables: Tables,
    // Blocking coordinator: one Notify per list key with BRPOPLPUSH waiters.
    waiters: Mutex<HashMap<String, Arc<Notify>>>,
}

/// Handle to the storage engine. Cheap to clone; all clones share one SQLite
/// connection. This is also the in-process client surface: every command is a
/// method that opens and commits its own transaction.
#[derive(Clone)]
pub struct Store {
    core: Arc<Core>,
}

/// Executor scoped to one open SQL transaction. Standalone commands get a
/// fresh one per call through [`Store::with_tx`]; EXEC threads a single `Tx`
/// through every buffered command.
pub struct Tx<'a> {
    conn: &'a Connection,
    tables: &'a Tables,
    now_ms: i64,
    // List keys written during this transaction; their waiters are signaled
    // after commit.
    pushed: RefCell<Vec<String>>,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as i64
}

impl Store {
    /// Opens (or creates) the database at `path` and runs the idempotent DDL.
    /// The table prefix is taken from `REDIS_SQLITE_PREFIX` when set.
    pub fn open(path: &str) -> Result<Store, StoreError> {
        Store::open_with_prefix(path, Tables::from_env())
    }

    pub fn open_in_memory() -> Result<Store, StoreError> {
        Store::open(":memory:")
    }

    pub fn open_with_prefix(path: &str, tables: Tables) -> Result<Store, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&tables.ddl())?;

        Ok(Store {
            core: Arc::new(Core {
                conn: Mutex::new(conn),
                tables,
                waiters: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Runs `f` inside one SQL transaction, committing on `Ok` and rolling
    /// back on `Err`. Waiters for list keys pushed during the transaction are
    /// woken only after the commit lands.
    pub fn with_tx<T, E>(&self, f: impl FnOnce(&Tx) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.core.conn.lock().unwrap();
        let sql_tx = conn.transaction()?;

        let tx = Tx {
            conn: &sql_tx,
            tables: &self.core.tables,
            now_ms: now_ms(),
            pushed: RefCell::new(Vec::new()),
        };

        let out = f(&tx)?;
        let pushed = tx.pushed.into_inner();

        sql_tx.commit()?;
        drop(conn);

        if !pushed.is_empty() {
            self.signal(&pushed);
        }

        Ok(out)
    }

    /// Spawns the expiry reaper: every second, delete rows whose expiry has
    /// elapsed. The task holds only a weak reference and exits once the last
    /// `Store` handle is dropped. Reap failures are swallowed; the next tick
    /// retries. Reads never depend on the reaper having run.
    pub fn start_reaper(&self) -> JoinHandle<()> {
        let core: Weak<Core> = Arc::downgrade(&self.core);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(core) = core.upgrade() else { break };
                let store = Store { core };

                match store.with_tx(|tx| tx.reap_expired()) {
                    Ok(0) => {}
                    Ok(reaped) => debug!("reaped {} expired rows", reaped),
                    Err(err) => warn!("expiry reap failed: {}", err),
                }
            }
        })
    }

    fn waiter(&self, key: &str) -> Arc<Notify> {
        let mut waiters = self.core.waiters.lock().unwrap();
        waiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    fn signal(&self, keys: &[String]) {
        let mut waiters = self.core.waiters.lock().unwrap();
        for key in keys {
            let mut drained = false;
            if let Some(notify) = waiters.get(key) {
                notify.notify_waiters();
                // Only the map itself still holds the Notify: no waiters left.
                drained = Arc::strong_count(notify) == 1;
            }
            if drained {
                waiters.remove(key);
            }
        }
    }

    // ---- in-process command surface ------------------------------------

    pub fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.with_tx(|tx| tx.set(key, value))
    }

    pub fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.with_tx(|tx| tx.get(key))
    }

    pub fn mget(&self, keys: &[String]) -> Result<Vec<Option<Bytes>>, StoreError> {
        self.with_tx(|tx| tx.mget(keys))
    }

    pub fn lpush(&self, key: &str, values: &[Bytes]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.lpush(key, values))
    }

    pub fn rpush(&self, key: &str, values: &[Bytes]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.rpush(key, values))
    }

    pub fn lpop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.with_tx(|tx| tx.lpop(key))
    }

    pub fn rpop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.with_tx(|tx| tx.rpop(key))
    }

    pub fn llen(&self, key: &str) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.llen(key))
    }

    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        self.with_tx(|tx| tx.lrange(key, start, stop))
    }

    pub fn rpoplpush(&self, source: &str, destination: &str) -> Result<Option<Bytes>, StoreError> {
        self.with_tx(|tx| tx.rpoplpush(source, destination))
    }

    /// Blocking RPOPLPUSH. Suspends until the source list has an element or
    /// the timeout elapses; `timeout_secs` of zero waits forever. Woken by
    /// pushes to the source key, then re-runs the move.
    pub async fn brpoplpush(
        &self,
        source: &str,
        destination: &str,
        timeout_secs: f64,
    ) -> Result<Option<Bytes>, StoreError> {
        let deadline = (timeout_secs > 0.0)
            .then(|| tokio::time::Instant::now() + Duration::from_secs_f64(timeout_secs));

        loop {
            if let Some(value) = self.rpoplpush(source, destination)? {
                return Ok(Some(value));
            }

            let notify = self.waiter(source);
            let notified = notify.notified();
            tokio::pin!(notified);
            // Arm the waiter before the second check so a push landing in
            // between is not lost.
            notified.as_mut().enable();

            if let Some(value) = self.rpoplpush(source, destination)? {
                return Ok(Some(value));
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return Ok(None);
                    }
                }
                None => notified.await,
            }
        }
    }

    pub fn hset(&self, key: &str, entries: &[(String, Bytes)]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.hset(key, entries))
    }

    pub fn hget(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError> {
        self.with_tx(|tx| tx.hget(key, field))
    }

    pub fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<Bytes>>, StoreError> {
        self.with_tx(|tx| tx.hmget(key, fields))
    }

    pub fn hdel(&self, key: &str, fields: &[String]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.hdel(key, fields))
    }

    pub fn sadd(&self, key: &str, members: &[Bytes]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.sadd(key, members))
    }

    pub fn srem(&self, key: &str, members: &[Bytes]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.srem(key, members))
    }

    pub fn sismember(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        self.with_tx(|tx| tx.sismember(key, member))
    }

    pub fn smembers(&self, key: &str) -> Result<Vec<Bytes>, StoreError> {
        self.with_tx(|tx| tx.smembers(key))
    }

    pub fn del(&self, keys: &[String]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.del(keys))
    }

    pub fn exists(&self, keys: &[String]) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.exists(keys))
    }

    pub fn expire(&self, key: &str, seconds: i64) -> Result<bool, StoreError> {
        self.with_tx(|tx| tx.expire(key, seconds))
    }

    pub fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.ttl(key))
    }

    pub fn pttl(&self, key: &str) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.pttl(key))
    }

    pub fn key_type(&self, key: &str) -> Result<Option<Kind>, StoreError> {
        self.with_tx(|tx| tx.kind_of(key))
    }

    pub fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.with_tx(|tx| tx.keys(pattern))
    }

    pub fn dbsize(&self) -> Result<i64, StoreError> {
        self.with_tx(|tx| tx.dbsize())
    }

    pub fn flush_all(&self) -> Result<(), StoreError> {
        self.with_tx(|tx| tx.flush_all())
    }
}

impl Tx<'_> {
    /// Liveness check: a row with a lapsed expiry is dead even before the
    /// reaper removes it, so every query here re-checks against `now_ms`.
    fn has_live_rows(&self, kind: Kind, key: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2) LIMIT 1",
            kind.table(self.tables)
        );
        let found = self
            .conn
            .query_row(&sql, params![key, self.now_ms], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// The store currently owning `key`, if any.
    pub fn kind_of(&self, key: &str) -> Result<Option<Kind>, StoreError> {
        for kind in Kind::ALL {
            if self.has_live_rows(kind, key)? {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }

    /// Type-exclusivity pre-flight: the key must not have live rows in any
    /// store other than `owner`. Runs before any row is written, so a
    /// WRONGTYPE failure never leaves a partial write behind.
    pub(crate) fn check_type(&self, key: &str, owner: Kind) -> Result<(), StoreError> {
        for kind in Kind::ALL {
            if kind != owner && self.has_live_rows(kind, key)? {
                return Err(StoreError::WrongType);
            }
        }
        Ok(())
    }

    /// Removes rows whose expiry has lapsed for this key, so a rewrite of an
    /// expired key starts from a clean slot instead of resurrecting state.
    pub(crate) fn purge_dead(&self, kind: Kind, key: &str) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE key = ?1 AND expiry IS NOT NULL AND expiry <= ?2",
            kind.table(self.tables)
        );
        self.conn.execute(&sql, params![key, self.now_ms])?;
        Ok(())
    }

    /// Current expiry of a live key, used so rows inserted into an existing
    /// hash/list/set inherit it and EXPIRE stays uniform across the key.
    pub(crate) fn current_expiry(&self, kind: Kind, key: &str) -> Result<Option<i64>, StoreError> {
        let sql = format!(
            "SELECT expiry FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2) LIMIT 1",
            kind.table(self.tables)
        );
        let expiry: Option<Option<i64>> = self
            .conn
            .query_row(&sql, params![key, self.now_ms], |row| row.get(0))
            .optional()?;
        Ok(expiry.flatten())
    }

    pub(crate) fn conn(&self) -> &Connection {
        self.conn
    }

    pub(crate) fn tables(&self) -> &Tables {
        self.tables
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn mark_pushed(&self, key: &str) {
        self.pushed.borrow_mut().push(key.to_string());
    }
}
