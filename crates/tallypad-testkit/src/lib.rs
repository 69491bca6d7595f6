// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tallypad_app::store::{
    card_feeds_key, feed_cards_key, last_selected_feed_key, policy_key, write_json,
};
use tallypad_app::{
    AccountId, Card, CardFeeds, CardId, CardState, CompanyFeed, FeedKey, FeedSettings,
    KeyValueStore, Navigator, PendingAction, Policy, PolicyId, PolicyKind, Route, Subscriber,
    SubscriberRegistry, SubscriptionId,
};

const FEED_KEYS: [&str; 10] = [
    "vcf",
    "cdf",
    "gl1025",
    "stripe",
    "oauth.chase.com",
    "oauth.americanexpressfdx.com",
    "oauth.capitalone.com",
    "oauth.brex.com",
    "plaid.ins_19",
    "plaid.ins_56",
];

const WORKSPACE_NAMES: [&str; 8] = [
    "Acme Field Ops",
    "Northwind Travel",
    "Blue Harbor Design",
    "Summit Labs",
    "Cedar Street Bakery",
    "Granite Logistics",
    "Lumen Studio",
    "Riverbend Clinic",
];

const NICKNAMES: [&str; 6] = [
    "Travel cards",
    "Marketing cards",
    "Ops cards",
    "Executive cards",
    "Field team",
    "Contractors",
];

/// Keys a numeric keypad can send.
pub const KEYPAD_KEYS: [&str; 13] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", ",", "<",
];

const FAILED_SCRAPE_RESULTS: [u16; 3] = [401, 403, 434];

#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    pub fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    pub fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.int_n(values.len())]
    }
}

/// Policies, feeds and cards for one workspace, ready to be written to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFixture {
    pub policy: Policy,
    pub card_feeds: CardFeeds,
    pub cards: BTreeMap<FeedKey, Vec<Card>>,
    pub last_selected_feed: Option<FeedKey>,
}

impl WorkspaceFixture {
    pub fn feed_keys(&self) -> Vec<FeedKey> {
        self.card_feeds
            .company_cards
            .iter()
            .map(|entry| entry.feed.clone())
            .collect()
    }

    pub fn seed<S>(&self, store: &mut S) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
    {
        write_json(store, &policy_key(&self.policy.id), &self.policy)?;
        write_json(store, &card_feeds_key(&self.policy.id), &self.card_feeds)?;
        for entry in &self.card_feeds.company_cards {
            let account_id = entry
                .settings
                .card_account_id(self.policy.workspace_account_id);
            let cards = self.cards.get(&entry.feed).cloned().unwrap_or_default();
            write_json(store, &feed_cards_key(account_id, &entry.feed), &cards)?;
        }
        if let Some(feed) = &self.last_selected_feed {
            write_json(store, &last_selected_feed_key(&self.policy.id), feed)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceFaker {
    rng: DeterministicRng,
    next_card_id: i64,
}

impl WorkspaceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_card_id: 1,
        }
    }

    pub fn rng(&mut self) -> &mut DeterministicRng {
        &mut self.rng
    }

    pub fn policy(&mut self, kind: PolicyKind) -> Policy {
        let number = self.rng.next_u64() % 0xFFFF_FFFF;
        Policy {
            id: PolicyId::new(format!("{number:08X}")),
            name: self.rng.pick(&WORKSPACE_NAMES).to_owned(),
            kind,
            workspace_account_id: AccountId::new((number % 9_000_000) as i64 + 1_000_000),
            are_company_cards_enabled: true,
        }
    }

    /// `count` distinct feeds in a shuffled order.
    pub fn card_feeds(&mut self, count: usize) -> CardFeeds {
        let mut pool = FEED_KEYS.to_vec();
        let mut feeds = CardFeeds::default();
        for _ in 0..count.min(FEED_KEYS.len()) {
            let key = pool.remove(self.rng.int_n(pool.len()));
            let pending_action = if self.rng.int_n(5) == 0 {
                Some(PendingAction::Delete)
            } else {
                None
            };
            feeds.company_cards.push(CompanyFeed {
                feed: FeedKey::from(key),
                settings: FeedSettings {
                    domain_id: None,
                    pending_action,
                    connection_broken: self.rng.int_n(4) == 0,
                },
            });
            if self.rng.int_n(3) == 0 {
                feeds
                    .company_card_nicknames
                    .insert(FeedKey::from(key), self.rng.pick(&NICKNAMES).to_owned());
            }
        }
        feeds
    }

    pub fn card(
        &mut self,
        feed: &FeedKey,
        state: CardState,
        last_scrape_result: Option<u16>,
    ) -> Card {
        let card_id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        Card {
            card_id,
            bank: feed.clone(),
            state,
            last_four: format!("{:04}", self.rng.int_n(10_000)),
            last_scrape_result,
        }
    }

    pub fn cards_for(&mut self, feed: &FeedKey, count: usize) -> Vec<Card> {
        (0..count)
            .map(|_| {
                let state = match self.rng.int_n(6) {
                    0 => CardState::Closed,
                    1 => CardState::NotActivated,
                    _ => CardState::Open,
                };
                let scrape = if self.rng.bool() {
                    Some(200)
                } else {
                    Some(FAILED_SCRAPE_RESULTS[self.rng.int_n(FAILED_SCRAPE_RESULTS.len())])
                };
                self.card(feed, state, scrape)
            })
            .collect()
    }

    pub fn workspace(&mut self, kind: PolicyKind, feed_count: usize) -> WorkspaceFixture {
        let policy = self.policy(kind);
        let card_feeds = self.card_feeds(feed_count);
        let mut cards = BTreeMap::new();
        for entry in &card_feeds.company_cards {
            let count = self.rng.int_n(4);
            cards.insert(entry.feed.clone(), self.cards_for(&entry.feed, count));
        }
        WorkspaceFixture {
            policy,
            card_feeds,
            cards,
            last_selected_feed: None,
        }
    }

    pub fn keypad_key(&mut self) -> &'static str {
        KEYPAD_KEYS[self.rng.int_n(KEYPAD_KEYS.len())]
    }
}

/// In-memory [`KeyValueStore`] that also records every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
    subscribers: SubscriberRegistry,
    writes: Vec<(String, Option<Value>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[(String, Option<Value>)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn keys(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match &value {
            Some(value) => {
                self.values.insert(key.to_owned(), value.clone());
            }
            None => {
                self.values.remove(key);
            }
        }
        self.writes.push((key.to_owned(), value.clone()));
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCall {
    Navigate(Route),
    GoBack(Route),
}

/// [`Navigator`] that keeps a path stack and logs every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    stack: Vec<String>,
    calls: Vec<NavigationCall>,
}

impl RecordingNavigator {
    pub fn at(route: &Route) -> Self {
        Self {
            stack: vec![route.path()],
            calls: Vec::new(),
        }
    }

    pub fn with_history(routes: &[Route]) -> Self {
        Self {
            stack: routes.iter().map(Route::path).collect(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[NavigationCall] {
        &self.calls
    }
}

impl Navigator for RecordingNavigator {
    fn active_route(&self) -> String {
        self.stack.last().cloned().unwrap_or_default()
    }

    fn navigate(&mut self, route: Route) -> Result<()> {
        self.stack.push(route.path());
        self.calls.push(NavigationCall::Navigate(route));
        Ok(())
    }

    fn go_back(&mut self, fallback: Route) -> Result<()> {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            self.stack = vec![fallback.path()];
        }
        self.calls.push(NavigationCall::GoBack(fallback));
        Ok(())
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("tallypad.db");
    Ok((dir, db_path))
}

pub fn feed_keys() -> &'static [&'static str] {
    &FEED_KEYS
}
