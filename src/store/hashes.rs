use bytes::Bytes;
use rusqlite::{params, OptionalExtension};

use crate::store::{Kind, StoreError, Tx};

impl Tx<'_> {
    /// Upserts field/value pairs. Returns the number of fields that did not
    /// exist before (the HSET contract; HMSET ignores the count). New rows
    /// inherit the key's current expiry so EXPIRE stays uniform.
    pub fn hset(&self, key: &str, entries: &[(String, Bytes)]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::Hash)?;
        self.purge_dead(Kind::Hash, key)?;

        let expiry = self.current_expiry(Kind::Hash, key)?;

        let probe = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND field = ?2",
            self.tables().hash
        );
        let upsert = format!(
            "INSERT INTO {} (key, field, value, expiry) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
            self.tables().hash
        );

        let mut added = 0;
        for (field, value) in entries {
            let existing = self
                .conn()
                .query_row(&probe, params![key, field], |_| Ok(()))
                .optional()?;
            if existing.is_none() {
                added += 1;
            }
            self.conn()
                .execute(&upsert, params![key, field, &value[..], expiry])?;
        }

        Ok(added)
    }

    pub fn hget(&self, key: &str, field: &str) -> Result<Option<Bytes>, StoreError> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND field = ?2
               AND (expiry IS NULL OR expiry > ?3)",
            self.tables().hash
        );
        let value: Option<Vec<u8>> = self
            .conn()
            .query_row(&sql, params![key, field, self.now_ms()], |row| row.get(0))
            .optional()?;

        Ok(value.map(Bytes::from))
    }

    /// One result slot per requested field, in argument order.
    pub fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<Bytes>>, StoreError> {
        fields.iter().map(|field| self.hget(key, field)).collect()
    }

    /// Returns the number of fields actually deleted, not the number asked
    /// for.
    pub fn hdel(&self, key: &str, fields: &[String]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::Hash)?;

        let delete = format!(
            "DELETE FROM {} WHERE key = ?1 AND field = ?2
               AND (expiry IS NULL OR expiry > ?3)",
            self.tables().hash
        );

        let mut removed = 0;
        for field in fields {
            removed += self
                .conn()
                .execute(&delete, params![key, field, self.now_ms()])? as i64;
        }

        Ok(removed)
    }
}
