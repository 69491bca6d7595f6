// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::{Currency, micros_to_backend, parse_micros};
use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyKind {
    Personal,
    Collect,
    Team,
    Corporate,
}

impl PolicyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Collect => "collect",
            Self::Team => "team",
            Self::Corporate => "corporate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(Self::Personal),
            "collect" => Some(Self::Collect),
            "team" => Some(Self::Team),
            "corporate" => Some(Self::Corporate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub kind: PolicyKind,
    pub workspace_account_id: AccountId,
    #[serde(default)]
    pub are_company_cards_enabled: bool,
}

impl Policy {
    pub fn is_collect(&self) -> bool {
        self.kind == PolicyKind::Collect
    }
}

/// Offline change waiting to be synced upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingAction {
    Add,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSettings {
    /// Domain that owns the feed's cards; falls back to the workspace account.
    #[serde(default)]
    pub domain_id: Option<AccountId>,
    #[serde(default)]
    pub pending_action: Option<PendingAction>,
    /// Connection status last reported for the feed record itself.
    #[serde(default)]
    pub connection_broken: bool,
}

impl FeedSettings {
    pub fn card_account_id(&self, workspace_account_id: AccountId) -> AccountId {
        self.domain_id.unwrap_or(workspace_account_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFeed {
    pub feed: FeedKey,
    #[serde(flatten)]
    pub settings: FeedSettings,
}

/// Company card feeds of a workspace, kept in upstream insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFeeds {
    #[serde(default)]
    pub company_cards: Vec<CompanyFeed>,
    #[serde(default)]
    pub company_card_nicknames: BTreeMap<FeedKey, String>,
}

impl CardFeeds {
    pub fn settings_for(&self, feed: &FeedKey) -> Option<&FeedSettings> {
        self.company_cards
            .iter()
            .find(|entry| &entry.feed == feed)
            .map(|entry| &entry.settings)
    }

    pub fn nickname_for(&self, feed: &FeedKey) -> Option<&str> {
        self.company_card_nicknames
            .get(feed)
            .map(String::as_str)
            .filter(|nickname| !nickname.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardState {
    NotIssued,
    Open,
    NotActivated,
    Deactivated,
    Closed,
    Suspended,
}

impl CardState {
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Deactivated | Self::Closed | Self::Suspended)
    }
}

/// Scrape results that do not count as a broken bank connection.
pub const IGNORED_SCRAPE_RESULTS: [u16; 4] = [500, 530, 531, 666];
pub const SCRAPE_RESULT_OK: u16 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: CardId,
    pub bank: FeedKey,
    pub state: CardState,
    #[serde(default)]
    pub last_four: String,
    #[serde(default)]
    pub last_scrape_result: Option<u16>,
}

impl Card {
    pub fn has_failed_connection(&self) -> bool {
        match self.last_scrape_result {
            Some(code) => code != SCRAPE_RESULT_OK && !IGNORED_SCRAPE_RESULTS.contains(&code),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Expensify,
    Vbba,
    Elsewhere,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expensify => "expensify",
            Self::Vbba => "vbba",
            Self::Elsewhere => "elsewhere",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "expensify" => Some(Self::Expensify),
            "vbba" => Some(Self::Vbba),
            "elsewhere" => Some(Self::Elsewhere),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IouType {
    Submit,
    Split,
    Pay,
    Track,
}

impl IouType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Split => "split",
            Self::Pay => "pay",
            Self::Track => "track",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submit" => Some(Self::Submit),
            "split" => Some(Self::Split),
            "pay" => Some(Self::Pay),
            "track" => Some(Self::Track),
            _ => None,
        }
    }
}

/// Tab of the expense modal the amount form is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestTab {
    #[default]
    Manual,
    Scan,
    Distance,
    PerDiem,
}

/// Amount accepted by the editor, handed to whoever opened it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMoney {
    pub amount: String,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl CurrentMoney {
    /// Backend amount (hundredths) for the accepted text.
    pub fn backend_amount(&self) -> Option<i64> {
        parse_micros(&self.amount).map(micros_to_backend)
    }
}
