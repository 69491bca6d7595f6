// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ports::KeyValueStore;
use crate::{AccountId, Card, CardFeeds, FeedKey, Policy, PolicyId};

pub const ADD_NEW_CARD_FLOW_KEY: &str = "addNewCompanyCardFeed";

pub fn policy_key(policy_id: &PolicyId) -> String {
    format!("policy_{policy_id}")
}

pub fn card_feeds_key(policy_id: &PolicyId) -> String {
    format!("cardFeeds_{policy_id}")
}

pub fn feed_cards_key(account_id: AccountId, feed: &FeedKey) -> String {
    format!("cards_{account_id}_{feed}")
}

pub fn last_selected_feed_key(policy_id: &PolicyId) -> String {
    format!("lastSelectedFeed_{policy_id}")
}

pub fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(value) = store.read(key)? else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .with_context(|| format!("decode stored value for key `{key}`"))
}

pub fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let encoded =
        serde_json::to_value(value).with_context(|| format!("encode value for key `{key}`"))?;
    store.write(key, Some(encoded))
}

pub fn read_policy<S>(store: &S, policy_id: &PolicyId) -> Result<Option<Policy>>
where
    S: KeyValueStore + ?Sized,
{
    read_json(store, &policy_key(policy_id))
}

pub fn read_card_feeds<S>(store: &S, policy_id: &PolicyId) -> Result<CardFeeds>
where
    S: KeyValueStore + ?Sized,
{
    Ok(read_json(store, &card_feeds_key(policy_id))?.unwrap_or_default())
}

pub fn read_feed_cards<S>(store: &S, account_id: AccountId, feed: &FeedKey) -> Result<Vec<Card>>
where
    S: KeyValueStore + ?Sized,
{
    Ok(read_json(store, &feed_cards_key(account_id, feed))?.unwrap_or_default())
}

pub fn read_last_selected_feed<S>(store: &S, policy_id: &PolicyId) -> Result<Option<FeedKey>>
where
    S: KeyValueStore + ?Sized,
{
    read_json(store, &last_selected_feed_key(policy_id))
}

pub fn write_last_selected_feed<S>(store: &mut S, policy_id: &PolicyId, feed: &FeedKey) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    write_json(store, &last_selected_feed_key(policy_id), feed)
}

pub fn clear_add_new_card_flow<S>(store: &mut S) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    store.write(ADD_NEW_CARD_FLOW_KEY, None)
}
