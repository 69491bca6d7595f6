// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Capabilities the screens borrow from their host: a reactive key-value
//! store and a navigation service.

use anyhow::Result;
use serde_json::Value;

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Called with the key and its new value after every write to that key.
pub type Subscriber = Box<dyn FnMut(&str, Option<&Value>)>;

pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<Value>>;
    /// `None` removes the key.
    fn write(&mut self, key: &str, value: Option<Value>) -> Result<()>;
    fn subscribe(&mut self, key: &str, subscriber: Subscriber) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

pub trait Navigator {
    fn active_route(&self) -> String;
    fn navigate(&mut self, route: Route) -> Result<()>;
    /// Pops the current screen, landing on `fallback` when there is no history.
    fn go_back(&mut self, fallback: Route) -> Result<()>;
}

/// Subscriber bookkeeping shared by store implementations.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(SubscriptionId, String, Subscriber)>,
}

impl SubscriberRegistry {
    pub fn add(&mut self, key: &str, subscriber: Subscriber) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId::new(self.next_id);
        self.entries.push((id, key.to_owned(), subscriber));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, key: &str, value: Option<&Value>) {
        for (_, subscribed_key, subscriber) in &mut self.entries {
            if subscribed_key == key {
                subscriber(key, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("next_id", &self.next_id)
            .field("subscribers", &self.entries.len())
            .finish()
    }
}
