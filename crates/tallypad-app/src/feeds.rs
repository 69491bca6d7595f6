// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ports::{KeyValueStore, Navigator};
use crate::routes::{COMPANY_CARDS_FEATURE, Route};
use crate::store::{
    clear_add_new_card_flow, read_card_feeds, read_feed_cards, read_last_selected_feed,
    read_policy, write_last_selected_feed,
};
use crate::{Card, CardFeeds, FeedKey, FeedSettings, PendingAction, Policy, PolicyId};

pub const PLAID_LOGO_BASE_URL: &str = "https://plaid-counterparty-logos.plaid.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CardBank {
    Visa,
    Mastercard,
    AmericanExpress,
    Stripe,
    Chase,
    BankOfAmerica,
    CapitalOne,
    Citibank,
    WellsFargo,
    Brex,
    Plaid,
    Other,
}

impl CardBank {
    pub fn for_feed(feed: &FeedKey) -> Self {
        if feed.plaid_institution_id().is_some() {
            return Self::Plaid;
        }
        // Additional feeds of the same provider carry a `#<n>` suffix.
        let base = feed
            .as_str()
            .split_once('#')
            .map_or(feed.as_str(), |(base, _)| base);
        match base {
            "vcf" | "oauth.visa.com" => Self::Visa,
            "cdf" | "oauth.mastercard.com" => Self::Mastercard,
            "gl1025" | "oauth.americanexpressfdx.com" => Self::AmericanExpress,
            "stripe" => Self::Stripe,
            "oauth.chase.com" => Self::Chase,
            "oauth.bankofamerica.com" => Self::BankOfAmerica,
            "oauth.capitalone.com" => Self::CapitalOne,
            "oauth.citibank.com" => Self::Citibank,
            "oauth.wellsfargo.com" => Self::WellsFargo,
            "oauth.brex.com" => Self::Brex,
            _ => Self::Other,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Stripe => "Stripe",
            Self::Chase => "Chase",
            Self::BankOfAmerica => "Bank of America",
            Self::CapitalOne => "Capital One",
            Self::Citibank => "Citibank",
            Self::WellsFargo => "Wells Fargo",
            Self::Brex => "Brex",
            Self::Plaid => "Plaid",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FeedIcon {
    Plaid { url: String },
    Bank { bank: CardBank },
}

impl FeedIcon {
    pub fn for_feed(feed: &FeedKey) -> Self {
        match feed.plaid_institution_id() {
            Some(institution) => Self::Plaid {
                url: format!("{PLAID_LOGO_BASE_URL}/{institution}.png"),
            },
            None => Self::Bank {
                bank: CardBank::for_feed(feed),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedListItem {
    pub feed_key: FeedKey,
    pub display_name: String,
    pub icon: FeedIcon,
    pub is_selected: bool,
    pub is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
    pub has_broken_connection: bool,
}

/// Name shown for a feed: the workspace nickname, else `"<Bank> cards"`.
pub fn feed_display_name(feed: &FeedKey, card_feeds: &CardFeeds) -> String {
    match card_feeds.nickname_for(feed) {
        Some(nickname) => nickname.to_owned(),
        None => format!("{} cards", CardBank::for_feed(feed).display_name()),
    }
}

/// True when every active card of the feed failed its last bank sync. With
/// no active cards the feed record's own status decides.
pub fn is_connection_broken(settings: &FeedSettings, cards: &[Card]) -> bool {
    let mut active = cards.iter().filter(|card| card.state.is_active()).peekable();
    if active.peek().is_none() {
        return settings.connection_broken;
    }
    active.all(Card::has_failed_connection)
}

pub fn list_feeds(
    card_feeds: &CardFeeds,
    cards_by_feed: &BTreeMap<FeedKey, Vec<Card>>,
    last_selected_feed: Option<&FeedKey>,
) -> Vec<FeedListItem> {
    card_feeds
        .company_cards
        .iter()
        .map(|entry| {
            let cards = cards_by_feed
                .get(&entry.feed)
                .map(Vec::as_slice)
                .unwrap_or_default();
            FeedListItem {
                feed_key: entry.feed.clone(),
                display_name: feed_display_name(&entry.feed, card_feeds),
                icon: FeedIcon::for_feed(&entry.feed),
                is_selected: last_selected_feed == Some(&entry.feed),
                is_disabled: entry.settings.pending_action == Some(PendingAction::Delete),
                pending_action: entry.settings.pending_action,
                has_broken_connection: is_connection_broken(&entry.settings, cards),
            }
        })
        .collect()
}

/// Company card feed picker for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSelector {
    policy: Policy,
    last_selected_feed: Option<FeedKey>,
    items: Vec<FeedListItem>,
}

impl FeedSelector {
    pub fn open<S>(store: &S, policy_id: &PolicyId) -> Result<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(policy) = read_policy(store, policy_id)? else {
            bail!("workspace {policy_id} not found -- check the policy id and retry");
        };
        if !policy.are_company_cards_enabled {
            bail!(
                "company cards are not enabled for workspace {policy_id} -- enable the feature before choosing a feed"
            );
        }

        let mut selector = Self {
            policy,
            last_selected_feed: None,
            items: Vec::new(),
        };
        selector.refresh(store)?;
        Ok(selector)
    }

    /// Recomputes the items from the current store contents.
    pub fn refresh<S>(&mut self, store: &S) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
    {
        let card_feeds = read_card_feeds(store, &self.policy.id)?;
        let mut cards_by_feed = BTreeMap::new();
        for entry in &card_feeds.company_cards {
            let account_id = entry
                .settings
                .card_account_id(self.policy.workspace_account_id);
            cards_by_feed.insert(
                entry.feed.clone(),
                read_feed_cards(store, account_id, &entry.feed)?,
            );
        }
        self.last_selected_feed = read_last_selected_feed(store, &self.policy.id)?;
        self.items = list_feeds(&card_feeds, &cards_by_feed, self.last_selected_feed.as_ref());
        tracing::debug!(policy = %self.policy.id, feeds = self.items.len(), "feed list refreshed");
        Ok(())
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn items(&self) -> &[FeedListItem] {
        &self.items
    }

    /// Row the list should scroll to first: the stored selection, else the
    /// first feed.
    pub fn initially_focused_feed(&self) -> Option<&FeedKey> {
        self.last_selected_feed
            .as_ref()
            .or_else(|| self.items.first().map(|item| &item.feed_key))
    }

    pub fn back_route(&self) -> Route {
        Route::CompanyCards {
            policy_id: self.policy.id.clone(),
        }
    }

    pub fn select_feed<S, N>(
        &self,
        store: &mut S,
        navigator: &mut N,
        item: &FeedListItem,
    ) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
        N: Navigator + ?Sized,
    {
        write_last_selected_feed(store, &self.policy.id, &item.feed_key)?;
        tracing::info!(policy = %self.policy.id, feed = %item.feed_key, "company card feed selected");
        navigator.go_back(self.back_route())
    }

    /// Starts the add-feed flow and returns the route it navigated to.
    pub fn add_feed<S, N>(&self, store: &mut S, navigator: &mut N) -> Result<Route>
    where
        S: KeyValueStore + ?Sized,
        N: Navigator + ?Sized,
    {
        clear_add_new_card_flow(store)?;
        let policy_id = self.policy.id.clone();
        let route = if self.policy.is_collect() && self.items.len() == 1 {
            Route::WorkspaceUpgrade {
                policy_id: policy_id.clone(),
                feature: COMPANY_CARDS_FEATURE.to_owned(),
                back_to: Box::new(Route::CompanyCardsSelectFeed { policy_id }),
            }
        } else {
            Route::CompanyCardsAddNew { policy_id }
        };
        tracing::info!(policy = %self.policy.id, route = %route, "starting add feed flow");
        navigator.navigate(route.clone())?;
        Ok(route)
    }
}
