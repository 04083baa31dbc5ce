use bytes::Bytes;
use rusqlite::{params, OptionalExtension};

use crate::store::{Kind, StoreError, Tx};

impl Tx<'_> {
    /// Insert-or-ignore each member; returns how many were actually new.
    pub fn sadd(&self, key: &str, members: &[Bytes]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::Set)?;
        self.purge_dead(Kind::Set, key)?;

        let expiry = self.current_expiry(Kind::Set, key)?;

        let insert = format!(
            "INSERT INTO {} (key, member, expiry) VALUES (?1, ?2, ?3)
             ON CONFLICT(key, member) DO NOTHING",
            self.tables().set
        );

        let mut added = 0;
        for member in members {
            added += self
                .conn()
                .execute(&insert, params![key, &member[..], expiry])? as i64;
        }

        Ok(added)
    }

    pub fn srem(&self, key: &str, members: &[Bytes]) -> Result<i64, StoreError> {
        self.check_type(key, Kind::Set)?;

        let delete = format!(
            "DELETE FROM {} WHERE key = ?1 AND member = ?2
               AND (expiry IS NULL OR expiry > ?3)",
            self.tables().set
        );

        let mut removed = 0;
        for member in members {
            removed += self
                .conn()
                .execute(&delete, params![key, &member[..], self.now_ms()])? as i64;
        }

        Ok(removed)
    }

    pub fn sismember(&self, key: &str, member: &[u8]) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND member = ?2
               AND (expiry IS NULL OR expiry > ?3)",
            self.tables().set
        );
        let found = self
            .conn()
            .query_row(&sql, params![key, member, self.now_ms()], |_| Ok(()))
            .optional()?;

        Ok(found.is_some())
    }

    /// All live members, ordered ascending (bytewise).
    pub fn smembers(&self, key: &str) -> Result<Vec<Bytes>, StoreError> {
        let sql = format!(
            "SELECT member FROM {} WHERE key = ?1 AND (expiry IS NULL OR expiry > ?2)
             ORDER BY member ASC",
            self.tables().set
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![key, self.now_ms()], |row| row.get::<_, Vec<u8>>(0))?;

        let mut members = Vec::new();
        for row in rows {
            members.push(Bytes::from(row?));
        }
        Ok(members)
    }
}
