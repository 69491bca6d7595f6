// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tallypad_app::store::{
    card_feeds_key, feed_cards_key, last_selected_feed_key, policy_key, write_json,
};
use tallypad_app::{
    AccountId, Card, CardFeeds, CardId, CardState, CompanyFeed, FeedKey, FeedSettings,
    KeyValueStore, PendingAction, Policy, PolicyId, PolicyKind, Subscriber, SubscriberRegistry,
    SubscriptionId,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub const APP_NAME: &str = "tallypad";
pub const DB_PATH_ENV: &str = "TALLYPAD_DB_PATH";
pub const DEMO_POLICY_ID: &str = "DEMO1";

const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];
const KV_UPDATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_kv_entries_updated_at ON kv_entries (updated_at)";

/// One stored key with its last write time, as listed by `--check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub key: String,
    pub updated_at: String,
}

/// SQLite-backed key-value store. Values are JSON documents; subscribers
/// registered on a key hear every write to it from this handle.
pub struct Store {
    conn: Connection,
    subscribers: SubscriberRegistry,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        debug!(path = %path.display(), "opened store");
        Ok(Self {
            conn,
            subscribers: SubscriberRegistry::default(),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            subscribers: SubscriberRegistry::default(),
        })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            check_kv_columns(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            info!("created store schema");
        }

        self.conn
            .execute_batch(KV_UPDATED_AT_INDEX)
            .context("ensure kv_entries index")
    }

    pub fn list_entries(&self, prefix: &str) -> Result<Vec<EntrySummary>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT key, updated_at
                FROM kv_entries
                WHERE substr(key, 1, length(?1)) = ?1
                ORDER BY key ASC
                ",
            )
            .context("prepare entry listing")?;
        let rows = stmt
            .query_map(params![prefix], |row| {
                Ok(EntrySummary {
                    key: row.get(0)?,
                    updated_at: row.get(1)?,
                })
            })
            .context("list entries")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect entries")
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Writes a small workspace with three feeds so every screen has
    /// something to show.
    pub fn seed_demo_data(&mut self) -> Result<()> {
        let policy_id = PolicyId::from(DEMO_POLICY_ID);
        let workspace_account = AccountId::new(1_000);
        let domain_account = AccountId::new(2_000);

        let policy = Policy {
            id: policy_id.clone(),
            name: "Tallypad Demo".to_owned(),
            kind: PolicyKind::Corporate,
            workspace_account_id: workspace_account,
            are_company_cards_enabled: true,
        };

        let visa = FeedKey::from("vcf");
        let amex = FeedKey::from("oauth.americanexpressfdx.com");
        let chase = FeedKey::from("plaid.ins_56");

        let card_feeds = CardFeeds {
            company_cards: vec![
                CompanyFeed {
                    feed: visa.clone(),
                    settings: FeedSettings::default(),
                },
                CompanyFeed {
                    feed: amex.clone(),
                    settings: FeedSettings {
                        domain_id: Some(domain_account),
                        ..FeedSettings::default()
                    },
                },
                CompanyFeed {
                    feed: chase.clone(),
                    settings: FeedSettings {
                        pending_action: Some(PendingAction::Add),
                        ..FeedSettings::default()
                    },
                },
            ],
            company_card_nicknames: BTreeMap::from([(chase.clone(), "Chase ops".to_owned())]),
        };

        let cards = [
            (
                workspace_account,
                &visa,
                vec![demo_card(1, &visa, CardState::Open, "4242", Some(200))],
            ),
            (
                domain_account,
                &amex,
                vec![
                    demo_card(2, &amex, CardState::Open, "1005", Some(403)),
                    demo_card(3, &amex, CardState::Closed, "2001", None),
                ],
            ),
            (
                workspace_account,
                &chase,
                vec![demo_card(4, &chase, CardState::NotActivated, "7788", None)],
            ),
        ];

        write_json(self, &policy_key(&policy_id), &policy)?;
        write_json(self, &card_feeds_key(&policy_id), &card_feeds)?;
        for (account_id, feed, feed_cards) in &cards {
            write_json(self, &feed_cards_key(*account_id, feed), feed_cards)?;
        }
        write_json(self, &last_selected_feed_key(&policy_id), &amex)?;
        info!(policy = %policy_id, "seeded demo workspace");
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read entry {key}"))
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert entry {key}"))?;
        Ok(())
    }

    fn delete_raw(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?", params![key])
            .with_context(|| format!("delete entry {key}"))?;
        Ok(())
    }
}

impl KeyValueStore for Store {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        self.get_raw(key)?
            .map(|raw| {
                serde_json::from_str(&raw).with_context(|| {
                    format!("entry `{key}` holds invalid JSON; run `tallypad --check` to inspect it")
                })
            })
            .transpose()
    }

    fn write(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match &value {
            Some(value) => {
                let encoded = serde_json::to_string(value)
                    .with_context(|| format!("encode entry {key}"))?;
                self.put_raw(key, &encoded)?;
            }
            None => self.delete_raw(key)?,
        }
        debug!(key, removed = value.is_none(), "store write");
        self.subscribers.notify(key, value.as_ref());
        Ok(())
    }

    fn subscribe(&mut self, key: &str, subscriber: Subscriber) -> SubscriptionId {
        self.subscribers.add(key, subscriber)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DB_PATH_ENV} to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("tallypad.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn demo_card(
    id: i64,
    feed: &FeedKey,
    state: CardState,
    last_four: &str,
    last_scrape_result: Option<u16>,
) -> Card {
    Card {
        card_id: CardId::new(id),
        bank: feed.clone(),
        state,
        last_four: last_four.to_owned(),
        last_scrape_result,
    }
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn check_kv_columns(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare("PRAGMA table_info(kv_entries)")
        .context("inspect kv_entries columns")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("query kv_entries columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("collect kv_entries columns")?;

    if columns.is_empty() {
        bail!(
            "database is missing table `kv_entries`; use a tallypad database or pass a new path"
        );
    }
    let missing: Vec<&str> = KV_COLUMNS
        .into_iter()
        .filter(|column| !columns.iter().any(|name| name == column))
        .collect();
    if !missing.is_empty() {
        bail!(
            "table `kv_entries` is missing columns: {}; recreate the database",
            missing.join(", ")
        );
    }
    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
