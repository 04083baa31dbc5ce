use bytes::Bytes;
use rusqlite::{params, OptionalExtension};

use crate::store::{Kind, StoreError, Tx};

impl Tx<'_> {
    /// Prepends values. Existing rows shift up by `values.len()`, then the new
    /// values land at indices `0..n` in reverse argument order, so the last
    /// argument becomes the head (LPUSH is LIFO). Returns the new length.
    pub fn lpush(&self, key: &str, values: &[Bytes]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::List)?;
        self.purge_dead(Kind::List, key)?;

        let expiry = self.current_expiry(Kind::List, key)?;
        let n = values.len() as i64;

        self.shift_indices(key, n)?;

        let insert = format!(
            "INSERT INTO {} (key, idx, value, expiry) VALUES (?1, ?2, ?3, ?4)",
            self.tables().list
        );
        for (offset, value) in values.iter().enumerate() {
            let idx = n - 1 - offset as i64;
            self.conn()
                .execute(&insert, params![key, idx, &value[..], expiry])?;
        }

        self.mark_pushed(key);
        self.list_len(key)
    }

    /// Appends values at the tail in argument order. Returns the new length.
    pub fn rpush(&self, key: &str, values: &[Bytes]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::List)?;
        self.purge_dead(Kind::List, key)?;

        let expiry = self.current_expiry(Kind::List, key)?;
        let len = self.list_len(key)?;

        let insert = format!(
            "INSERT INTO {} (key, idx, value, expiry) VALUES (?1, ?2, ?3, ?4)",
            self.tables().list
        );
        for (offset, value) in values.iter().enumerate() {
            let idx = len + offset as i64;
            self.conn()
                .execute(&insert, params![key, idx, &value[..], expiry])?;
        }

        self.mark_pushed(key);
        self.list_len(key)
    }

    pub fn lpop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.check_type(key, Kind::List)?;

        let Some((idx, value)) = self.edge_row(key, "ASC")? else {
            return Ok(None);
        };

        let delete = format!("DELETE FROM {} WHERE key = ?1 AND idx = ?2", self.tables().list);
        self.conn().execute(&delete, params![key, idx])?;
        self.collapse_indices(key, idx)?;

        Ok(Some(value))
    }

    /// Tail removal needs no renumbering; the surviving indices stay
    /// contiguous from zero.
    pub fn rpop(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.check_type(key, Kind::List)?;

        let Some((idx, value)) = self.edge_row(key, "DESC")? else {
            return Ok(None);
        };

        let delete = format!("DELETE FROM {} WHERE key = ?1 AND idx = ?2", self.tables().list);
        self.conn().execute(&delete, params![key, idx])?;

        Ok(Some(value))
    }

    pub fn llen(&self, key: &str) -> Result<i64, StoreError> {
        self.check_type(key, Kind::List)?;
        self.list_len(key)
    }

    /// Inclusive range with Redis negative-index semantics: negatives count
    /// from the tail, bounds are clamped to the list, and an inverted range
    /// is empty.
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        self.check_type(key, Kind::List)?;

        let len = self.list_len(key)?;
        if len == 0 {
            return Ok(Vec::new());
        }

        let start = if start < 0 { len + start } else { start }.max(0);
        let stop = if stop < 0 { len + stop } else { stop }.min(len - 1);
        if start > stop {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND idx BETWEEN ?2 AND ?3
               AND (expiry IS NULL OR expiry > ?4)
             ORDER BY idx ASC",
            self.tables().list
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![key, start, stop, self.now_ms()], |row| {
            row.get::<_, Vec<u8>>(0)
        })?;

        let mut values = Vec::new();
        for row in rows {
            values.push(Bytes::from(row?));
        }
        Ok(values)
    }

    /// Atomic tail-to-head move; both sides happen inside this transaction.
    /// The push side registers the destination for waiter wakeup on commit.
    /// The destination's type is checked before the pop, so a WRONGTYPE
    /// failure leaves the source untouched.
    pub fn rpoplpush(&self, source: &str, destination: &str) -> Result<Option<Bytes>, StoreError> {
        self.check_type(source, Kind::List)?;
        if self.list_len(source)? == 0 {
            return Ok(None);
        }
        self.check_type(destination, Kind::List)?;

        match self.rpop(source)? {
            None => Ok(None),
            Some(value) => {
                self.lpush(destination, std::slice::from_ref(&value))?;
                Ok(Some(value))
            }
        }
    }

    fn list_len(&self, key: &str) -> Result<i64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2)",
            self.tables().list
        );
        let len = self
            .conn()
            .query_row(&sql, params![key, self.now_ms()], |row| row.get(0))?;
        Ok(len)
    }

    fn edge_row(&self, key: &str, order: &str) -> Result<Option<(i64, Bytes)>, StoreError> {
        let sql = format!(
            "SELECT idx, value FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2)
             ORDER BY idx {} LIMIT 1",
            self.tables().list,
            order
        );
        let row = self
            .conn()
            .query_row(&sql, params![key, self.now_ms()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
            })
            .optional()?;

        Ok(row.map(|(idx, value)| (idx, Bytes::from(value))))
    }

    // Renumbering goes through a negate-then-flip two-step so the (key, idx)
    // primary key is never transiently violated mid-UPDATE.
    fn shift_indices(&self, key: &str, by: i64) -> Result<(), StoreError> {
        let negate = format!(
            "UPDATE {} SET idx = -(idx + ?2) WHERE key = ?1",
            self.tables().list
        );
        self.conn().execute(&negate, params![key, by])?;
        self.flip_negated(key)
    }

    fn collapse_indices(&self, key: &str, removed_idx: i64) -> Result<(), StoreError> {
        let negate = format!(
            "UPDATE {} SET idx = -(idx - 1) WHERE key = ?1 AND idx > ?2",
            self.tables().list
        );
        self.conn().execute(&negate, params![key, removed_idx])?;
        self.flip_negated(key)
    }

    fn flip_negated(&self, key: &str) -> Result<(), StoreError> {
        let flip = format!(
            "UPDATE {} SET idx = -idx WHERE key = ?1 AND idx < 0",
            self.tables().list
        );
        self.conn().execute(&flip, params![key])?;
        Ok(())
    }
}
