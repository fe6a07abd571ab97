//! # Storage Module - Message and User Persistence
//!
//! The [`Store`] owns every persisted entity of the BBS: messages, users and read receipts.
//! It wraps a single SQLite connection opened in write-ahead-log mode so that the sibling
//! session processes (one per connected caller) can read and write the same database file
//! at the same time.
//!
//! ## Transactions
//!
//! Every public operation runs in its own short transaction that commits on success and
//! rolls back when dropped on error. No transaction ever outlives a call, so nothing is
//! held open while a session blocks waiting for the caller to type. Writers start with
//! `BEGIN IMMEDIATE` to take the write lock up front instead of failing on lock upgrade.
//!
//! ## Visibility
//!
//! - Public messages are listed to everyone.
//! - Private messages are listed and readable only by their recipient.
//! - Senders and recipients are stored upper-cased; every query normalizes the caller's
//!   callsign the same way.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rsbbs::storage::{NewMessage, Store};
//!
//! fn main() -> rsbbs::errors::Result<()> {
//!     let mut store = Store::open("rsbbs.db")?;
//!     let msg = store.create_message(&NewMessage {
//!         sender: "n0call",
//!         recipient: "n1abc",
//!         subject: "Net tonight",
//!         body: "See you on 145.050\n",
//!         is_private: false,
//!     })?;
//!     assert_eq!(msg.recipient, "N1ABC");
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::errors::Result;
use crate::validation::normalize_callsign;

/// How long a writer waits on a sibling session's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        sender      TEXT NOT NULL,
        recipient   TEXT NOT NULL,
        subject     TEXT NOT NULL,
        body        TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        is_private  INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_messages_recipient
        ON messages(recipient, id);

    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        callsign    TEXT NOT NULL UNIQUE,
        given_name  TEXT,
        family_name TEXT,
        login_count INTEGER NOT NULL DEFAULT 1,
        login_last  TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS read_receipts (
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        message_id  INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
        read_at     TEXT NOT NULL,
        PRIMARY KEY (user_id, message_id)
    );
";

const MESSAGE_COLUMNS: &str = "id, sender, recipient, subject, body, created_at, is_private";

/// A stored message. There is no update operation; messages are created, read and deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_private: bool,
}

impl Message {
    /// Public messages are visible to everyone; private ones only to their recipient.
    pub fn is_visible_to(&self, callsign: &str) -> bool {
        !self.is_private || self.is_addressed_to(callsign)
    }

    pub fn is_addressed_to(&self, callsign: &str) -> bool {
        self.recipient == normalize_callsign(callsign)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Message {
            id: row.get(0)?,
            sender: row.get(1)?,
            recipient: row.get(2)?,
            subject: row.get(3)?,
            body: row.get(4)?,
            created_at: row.get(5)?,
            is_private: row.get(6)?,
        })
    }
}

/// Fields supplied by the caller when creating a message; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub sender: &'a str,
    pub recipient: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub callsign: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub login_count: i64,
    /// Timestamp of the previous login (the value before the current session overwrote it).
    pub login_last: DateTime<Utc>,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            callsign: row.get(1)?,
            given_name: row.get(2)?,
            family_name: row.get(3)?,
            login_count: row.get(4)?,
            login_last: row.get(5)?,
        })
    }
}

/// Result of a bulk delete: how many rows went away and what they were.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedMessages {
    pub count: usize,
    pub deleted: Vec<Message>,
}

impl DeletedMessages {
    /// Removed ids as `#1, #4, ...` for the log.
    pub fn id_list(&self) -> String {
        self.deleted
            .iter()
            .map(|m| format!("#{}", m.id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// SQLite-backed message and user store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path`, enable WAL mode and create the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.create_schema()?;
        info!("message store opened at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database (tests and throwaway sessions).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Look up a user by callsign, creating it with `login_count = 1` when absent.
    ///
    /// Returns the user and whether it was created by this call.
    pub fn find_or_create_user(&mut self, callsign: &str) -> Result<(User, bool)> {
        let call = normalize_callsign(callsign);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO users (callsign, login_count, login_last) VALUES (?1, 1, ?2)",
            params![call, Utc::now()],
        )?;
        let user = tx.query_row(
            "SELECT id, callsign, given_name, family_name, login_count, login_last
             FROM users WHERE callsign = ?1",
            params![call],
            User::from_row,
        )?;
        tx.commit()?;
        if inserted > 0 {
            info!("user {} added", user.callsign);
        } else {
            debug!("user {} found", user.callsign);
        }
        Ok((user, inserted > 0))
    }

    /// Increment the login count and rotate `login_last` to now.
    ///
    /// Returns the previous `login_last`, or `None` (logged only) when the user no longer exists.
    pub fn record_login(&mut self, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let previous: Option<DateTime<Utc>> = tx
            .query_row(
                "SELECT login_last FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if previous.is_none() {
            warn!("record_login: user {} not found", user_id);
            return Ok(None);
        }
        tx.execute(
            "UPDATE users SET login_count = login_count + 1, login_last = ?2 WHERE id = ?1",
            params![user_id, Utc::now()],
        )?;
        tx.commit()?;
        Ok(previous)
    }

    /// Messages that are public or addressed to `caller`, oldest first.
    pub fn list_public_or_addressed(&mut self, caller: &str) -> Result<Vec<Message>> {
        let call = normalize_callsign(caller);
        self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE is_private = 0 OR recipient = ?1 ORDER BY id ASC"
            ),
            params![call],
        )
    }

    /// Every message addressed to `caller`, public or private, oldest first.
    pub fn list_addressed(&mut self, caller: &str) -> Result<Vec<Message>> {
        let call = normalize_callsign(caller);
        self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE recipient = ?1 ORDER BY id ASC"
            ),
            params![call],
        )
    }

    /// Messages addressed to `caller` that `user_id` has no read receipt for.
    pub fn list_unread(&mut self, caller: &str, user_id: i64) -> Result<Vec<Message>> {
        let call = normalize_callsign(caller);
        self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.recipient = ?1
                   AND NOT EXISTS (
                       SELECT 1 FROM read_receipts r
                       WHERE r.message_id = m.id AND r.user_id = ?2)
                 ORDER BY m.id ASC"
            ),
            params![call, user_id],
        )
    }

    fn query_messages(
        &mut self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Message>> {
        let tx = self.conn.transaction()?;
        let messages = {
            let mut stmt = tx.prepare(sql)?;
            let rows = stmt.query_map(params, Message::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(messages)
    }

    pub fn get_message(&mut self, id: i64) -> Result<Option<Message>> {
        let tx = self.conn.transaction()?;
        let message = tx
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                Message::from_row,
            )
            .optional()?;
        tx.commit()?;
        Ok(message)
    }

    /// Persist a new message; sender and recipient are upper-cased here regardless of input.
    pub fn create_message(&mut self, new: &NewMessage<'_>) -> Result<Message> {
        let message = {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let created_at = Utc::now();
            let sender = normalize_callsign(new.sender);
            let recipient = normalize_callsign(new.recipient);
            tx.execute(
                "INSERT INTO messages (sender, recipient, subject, body, created_at, is_private)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![sender, recipient, new.subject, new.body, created_at, new.is_private],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Message {
                id,
                sender,
                recipient,
                subject: new.subject.to_string(),
                body: new.body.to_string(),
                created_at,
                is_private: new.is_private,
            }
        };
        info!(
            "message {} saved from {} to {} (private={})",
            message.id, message.sender, message.recipient, message.is_private
        );
        Ok(message)
    }

    /// Delete message `id` only when it is addressed to `caller`. Returns whether a row went away.
    pub fn delete_message(&mut self, id: i64, caller: &str) -> Result<bool> {
        let call = normalize_callsign(caller);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM messages WHERE id = ?1 AND recipient = ?2",
            params![id, call],
        )?;
        tx.commit()?;
        if removed > 0 {
            info!("deleted message {}", id);
        }
        Ok(removed > 0)
    }

    /// Delete every message addressed to `callsign`, returning what was removed.
    pub fn delete_all_addressed_to(&mut self, callsign: &str) -> Result<DeletedMessages> {
        let call = normalize_callsign(callsign);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE recipient = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![call], Message::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        let removed = tx.execute("DELETE FROM messages WHERE recipient = ?1", params![call])?;
        tx.commit()?;
        if removed != deleted.len() {
            warn!(
                "bulk delete for {} removed {} rows but selected {}",
                call,
                removed,
                deleted.len()
            );
        }
        info!("deleted {} messages addressed to {}", removed, call);
        Ok(DeletedMessages {
            count: removed,
            deleted,
        })
    }

    /// Record that `user_id` read `message_id`. Idempotent; a missing message is a no-op.
    pub fn mark_read(&mut self, user_id: i64, message_id: i64) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO read_receipts (user_id, message_id, read_at)
             SELECT ?1, id, ?3 FROM messages WHERE id = ?2",
            params![user_id, message_id, Utc::now()],
        )?;
        tx.commit()?;
        if inserted > 0 {
            debug!("user {} read message {}", user_id, message_id);
        }
        Ok(())
    }

    pub fn count_messages(&mut self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM messages")
    }

    pub fn count_users(&mut self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM users")
    }

    fn count(&mut self, sql: &str) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let n: i64 = tx.query_row(sql, [], |row| row.get(0))?;
        tx.commit()?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(store: &mut Store, from: &str, to: &str, private: bool) -> Message {
        store
            .create_message(&NewMessage {
                sender: from,
                recipient: to,
                subject: "subj",
                body: "body\n",
                is_private: private,
            })
            .unwrap()
    }

    fn receipt_rows(store: &Store, user_id: i64, message_id: i64) -> i64 {
        store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM read_receipts WHERE user_id = ?1 AND message_id = ?2",
                params![user_id, message_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn create_then_get_upper_cases_callsigns() {
        let mut store = Store::open_in_memory().unwrap();
        let created = store
            .create_message(&NewMessage {
                sender: "n0call",
                recipient: " n1abc",
                subject: "Test",
                body: "Line one\nLine two\n",
                is_private: false,
            })
            .unwrap();
        let fetched = store.get_message(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.sender, "N0CALL");
        assert_eq!(fetched.recipient, "N1ABC");
        assert_eq!(fetched.body, "Line one\nLine two\n");
    }

    #[test]
    fn private_messages_only_listed_to_recipient() {
        let mut store = Store::open_in_memory().unwrap();
        let public = post(&mut store, "N0CALL", "ALL", false);
        let private = post(&mut store, "N0CALL", "N1ABC", true);

        let other: Vec<i64> = store
            .list_public_or_addressed("N2XYZ")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(other, vec![public.id]);

        let recipient: Vec<i64> = store
            .list_public_or_addressed("n1abc")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(recipient, vec![public.id, private.id]);
    }

    #[test]
    fn addressed_listing_includes_public_and_private() {
        let mut store = Store::open_in_memory().unwrap();
        let a = post(&mut store, "N0CALL", "N1ABC", false);
        post(&mut store, "N0CALL", "N2XYZ", false);
        let b = post(&mut store, "N2XYZ", "N1ABC", true);
        let ids: Vec<i64> = store
            .list_addressed("N1ABC")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        let (user, _) = store.find_or_create_user("N1ABC").unwrap();
        let msg = post(&mut store, "N0CALL", "N1ABC", false);
        store.mark_read(user.id, msg.id).unwrap();
        store.mark_read(user.id, msg.id).unwrap();
        assert_eq!(receipt_rows(&store, user.id, msg.id), 1);
    }

    #[test]
    fn mark_read_of_missing_message_is_noop() {
        let mut store = Store::open_in_memory().unwrap();
        let (user, _) = store.find_or_create_user("N1ABC").unwrap();
        store.mark_read(user.id, 999).unwrap();
        assert_eq!(receipt_rows(&store, user.id, 999), 0);
    }

    #[test]
    fn unread_excludes_receipted_messages() {
        let mut store = Store::open_in_memory().unwrap();
        let (user, _) = store.find_or_create_user("N1ABC").unwrap();
        let first = post(&mut store, "N0CALL", "N1ABC", false);
        let second = post(&mut store, "N0CALL", "N1ABC", true);
        store.mark_read(user.id, first.id).unwrap();
        let unread: Vec<i64> = store
            .list_unread("N1ABC", user.id)
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(unread, vec![second.id]);
    }

    #[test]
    fn delete_restricted_to_recipient() {
        let mut store = Store::open_in_memory().unwrap();
        let msg = post(&mut store, "N0CALL", "N1ABC", false);
        assert!(!store.delete_message(msg.id, "N2XYZ").unwrap());
        assert!(store.get_message(msg.id).unwrap().is_some());
        assert!(store.delete_message(msg.id, "n1abc").unwrap());
        assert!(store.get_message(msg.id).unwrap().is_none());
        assert!(!store.delete_message(msg.id, "N1ABC").unwrap());
    }

    #[test]
    fn bulk_delete_scope_and_second_pass() {
        let mut store = Store::open_in_memory().unwrap();
        let a = post(&mut store, "N0CALL", "N1ABC", false);
        let b = post(&mut store, "N0CALL", "N1ABC", true);
        let keep = post(&mut store, "N1ABC", "N2XYZ", false);

        let first = store.delete_all_addressed_to("n1abc").unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(first.deleted.len(), 2);
        assert_eq!(first.id_list(), format!("#{}, #{}", a.id, b.id));
        assert!(first.deleted.iter().all(|m| m.recipient == "N1ABC"));
        assert_eq!(store.count_messages().unwrap(), 1);
        assert!(store.get_message(keep.id).unwrap().is_some());

        let second = store.delete_all_addressed_to("N1ABC").unwrap();
        assert_eq!(second, DeletedMessages::default());
        assert_eq!(second.id_list(), "");
        assert_eq!(store.count_messages().unwrap(), 1);
    }

    #[test]
    fn deleting_a_message_drops_its_receipts() {
        let mut store = Store::open_in_memory().unwrap();
        let (user, _) = store.find_or_create_user("N1ABC").unwrap();
        let msg = post(&mut store, "N0CALL", "N1ABC", false);
        store.mark_read(user.id, msg.id).unwrap();
        store.delete_message(msg.id, "N1ABC").unwrap();
        assert_eq!(receipt_rows(&store, user.id, msg.id), 0);
    }

    #[test]
    fn user_lookup_and_login_bookkeeping() {
        let mut store = Store::open_in_memory().unwrap();
        let (created, was_created) = store.find_or_create_user("k1abc").unwrap();
        assert!(was_created);
        assert_eq!(created.callsign, "K1ABC");
        assert_eq!(created.login_count, 1);

        let (again, was_created) = store.find_or_create_user("K1ABC").unwrap();
        assert!(!was_created);
        assert_eq!(again.id, created.id);

        let previous = store.record_login(created.id).unwrap();
        assert_eq!(previous, Some(created.login_last));
        let (after, _) = store.find_or_create_user("K1ABC").unwrap();
        assert_eq!(after.login_count, 2);
        assert!(after.login_last >= created.login_last);
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn record_login_for_vanished_user_is_noop() {
        let mut store = Store::open_in_memory().unwrap();
        assert_eq!(store.record_login(42).unwrap(), None);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = Store::open_in_memory().unwrap();
        let first = post(&mut store, "N0CALL", "N1ABC", false);
        store.delete_message(first.id, "N1ABC").unwrap();
        let second = post(&mut store, "N0CALL", "N1ABC", false);
        assert!(second.id > first.id);
    }
}
