use std::env;

pub const DEFAULT_PREFIX: &str = "redis_";

/// Environment variable overriding the table-name prefix, so multiple logical
/// databases can share one SQLite file.
pub const PREFIX_ENV_VAR: &str = "REDIS_SQLITE_PREFIX";

/// Resolved table names for the four stores sharing the key namespace.
#[derive(Debug, Clone)]
pub struct Tables {
    pub string: String,
    pub hash: String,
    pub list: String,
    pub set: String,
}

impl Tables {
    pub fn with_prefix(prefix: &str) -> Tables {
        Tables {
            string: format!("{}string_store", prefix),
            hash: format!("{}hash_store", prefix),
            list: format!("{}list_store", prefix),
            set: format!("{}set_store", prefix),
        }
    }

    pub fn from_env() -> Tables {
        let prefix = env::var(PREFIX_ENV_VAR).unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
        Tables::with_prefix(&prefix)
    }

    /// Idempotent DDL for the four stores. `expiry` is a millisecond-precision
    /// absolute timestamp, NULL for keys without expiration; each table gets a
    /// partial index on it for reaper scans.
    pub fn ddl(&self) -> String {
        format!(
            r#"
CREATE TABLE IF NOT EXISTS {string} (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expiry INTEGER
);
CREATE INDEX IF NOT EXISTS {string}_expiry ON {string}(expiry) WHERE expiry IS NOT NULL;

CREATE TABLE IF NOT EXISTS {hash} (
    key TEXT NOT NULL,
    field TEXT NOT NULL,
    value BLOB NOT NULL,
    expiry INTEGER,
    PRIMARY KEY (key, field)
);
CREATE INDEX IF NOT EXISTS {hash}_expiry ON {hash}(expiry) WHERE expiry IS NOT NULL;

CREATE TABLE IF NOT EXISTS {list} (
    key TEXT NOT NULL,
    idx INTEGER NOT NULL,
    value BLOB NOT NULL,
    expiry INTEGER,
    PRIMARY KEY (key, idx)
);
CREATE INDEX IF NOT EXISTS {list}_expiry ON {list}(expiry) WHERE expiry IS NOT NULL;

CREATE TABLE IF NOT EXISTS {set} (
    key TEXT NOT NULL,
    member BLOB NOT NULL,
    expiry INTEGER,
    PRIMARY KEY (key, member)
);
CREATE INDEX IF NOT EXISTS {set}_expiry ON {set}(expiry) WHERE expiry IS NOT NULL;
"#,
            string = self.string,
            hash = self.hash,
            list = self.list,
            set = self.set,
        )
    }
}
