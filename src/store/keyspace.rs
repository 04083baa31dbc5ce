use std::collections::BTreeSet;

use glob_match::glob_match;
use rusqlite::params;

use crate::store::{Kind, StoreError, Tx};

impl Tx<'_> {
    /// Removes every row for each key across all four stores. Counts a key
    /// only if it was live at call time; dead-but-unreaped rows are swept but
    /// a reaped key "does not exist" and must not count.
    pub fn del(&self, keys: &[String]) -> Result<i64, StoreError> {
        let mut count = 0;

        for key in keys {
            if self.kind_of(key)?.is_some() {
                count += 1;
            }
            for kind in Kind::ALL {
                let sql = format!("DELETE FROM {} WHERE key = ?1", kind.table(self.tables()));
                self.conn().execute(&sql, params![key])?;
            }
        }

        Ok(count)
    }

    /// One per key with any live row; repeated keys count repeatedly.
    pub fn exists(&self, keys: &[String]) -> Result<i64, StoreError> {
        let mut count = 0;
        for key in keys {
            if self.kind_of(key)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Sets an absolute expiry on every live row of the key's owning store.
    /// Returns false when the key does not exist.
    pub fn expire(&self, key: &str, seconds: i64) -> Result<bool, StoreError> {
        let Some(kind) = self.kind_of(key)? else {
            return Ok(false);
        };

        let expiry = self.now_ms() + seconds * 1000;
        let sql = format!(
            "UPDATE {} SET expiry = ?2 WHERE key = ?1 AND (expiry IS NULL OR expiry > ?3)",
            kind.table(self.tables())
        );
        let updated = self
            .conn()
            .execute(&sql, params![key, expiry, self.now_ms()])?;

        Ok(updated > 0)
    }

    /// Remaining seconds rounded up; -2 when the key does not exist, -1 when
    /// it has no expiry.
    pub fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        match self.pttl(key)? {
            millis if millis < 0 => Ok(millis),
            millis => Ok((millis + 999) / 1000),
        }
    }

    pub fn pttl(&self, key: &str) -> Result<i64, StoreError> {
        let Some(kind) = self.kind_of(key)? else {
            return Ok(-2);
        };

        match self.current_expiry(kind, key)? {
            None => Ok(-1),
            Some(expiry) => Ok(expiry - self.now_ms()),
        }
    }

    /// All live keys matching a glob pattern (`*`, `?`, `[set]`). Patterns are
    /// matched in memory over the merged key namespace; results are sorted
    /// for determinism.
    pub fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .live_keys()?
            .into_iter()
            .filter(|key| glob_match(pattern, key))
            .collect())
    }

    /// Number of distinct live keys across the four stores.
    pub fn dbsize(&self) -> Result<i64, StoreError> {
        Ok(self.live_keys()?.len() as i64)
    }

    /// Truncates all four stores.
    pub fn flush_all(&self) -> Result<(), StoreError> {
        for kind in Kind::ALL {
            let sql = format!("DELETE FROM {}", kind.table(self.tables()));
            self.conn().execute(&sql, [])?;
        }
        Ok(())
    }

    /// Deletes every row whose expiry has lapsed, across all stores. The
    /// reaper calls this once a second; reads never rely on it having run.
    pub fn reap_expired(&self) -> Result<i64, StoreError> {
        let mut reaped = 0;
        for kind in Kind::ALL {
            let sql = format!(
                "DELETE FROM {} WHERE expiry IS NOT NULL AND expiry <= ?1",
                kind.table(self.tables())
            );
            reaped += self.conn().execute(&sql, params![self.now_ms()])? as i64;
        }
        Ok(reaped)
    }

    fn live_keys(&self) -> Result<BTreeSet<String>, StoreError> {
        let mut keys = BTreeSet::new();

        for kind in Kind::ALL {
            let sql = format!(
                "SELECT DISTINCT key FROM {} WHERE expiry IS NULL OR expiry > ?1",
                kind.table(self.tables())
            );
            let mut stmt = self.conn().prepare(&sql)?;
            let rows = stmt.query_map(params![self.now_ms()], |row| row.get::<_, String>(0))?;
            for row in rows {
                keys.insert(row?);
            }
        }

        Ok(keys)
    }
}
