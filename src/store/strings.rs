use bytes::Bytes;
use rusqlite::{params, OptionalExtension};

use crate::store::{Kind, StoreError, Tx};

impl Tx<'_> {
    /// Upserts the string row. A live expiry on the existing row is kept (the
    /// documented divergence from classic Redis SET, which clears it); a
    /// lapsed one is purged first so the key starts clean.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_type(key, Kind::String)?;
        self.purge_dead(Kind::String, key)?;

        let sql = format!(
            "INSERT INTO {} (key, value, expiry) VALUES (?1, ?2, NULL)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            self.tables().string
        );
        self.conn().execute(&sql, params![key, value])?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2)",
            self.tables().string
        );
        let value: Option<Vec<u8>> = self
            .conn()
            .query_row(&sql, params![key, self.now_ms()], |row| row.get(0))
            .optional()?;

        Ok(value.map(Bytes::from))
    }

    pub fn mget(&self, keys: &[String]) -> Result<Vec<Option<Bytes>>, StoreError> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}
