// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde_json::json;
use tallypad_app::store::{
    ADD_NEW_CARD_FLOW_KEY, last_selected_feed_key, read_last_selected_feed, write_json,
};
use tallypad_app::{
    AccountId, COMPANY_CARDS_FEATURE, CardState, FeedKey, FeedSelector, FeedSettings,
    KeyValueStore, Navigator, PolicyId, PolicyKind, Route,
};
use tallypad_testkit::{MemoryStore, NavigationCall, RecordingNavigator, WorkspaceFaker};

fn select_feed_route(policy_id: &PolicyId) -> Route {
    Route::CompanyCardsSelectFeed {
        policy_id: policy_id.clone(),
    }
}

#[test]
fn select_feed_performs_one_write_and_one_navigation() -> Result<()> {
    let mut store = MemoryStore::new();
    let mut fixture = WorkspaceFaker::new(3).workspace(PolicyKind::Corporate, 4);
    fixture.last_selected_feed = fixture.feed_keys().first().cloned();
    fixture.seed(&mut store)?;
    store.clear_writes();

    let policy_id = fixture.policy.id.clone();
    let selector = FeedSelector::open(&store, &policy_id)?;
    let target = selector.items()[2].clone();
    let mut navigator = RecordingNavigator::with_history(&[
        Route::CompanyCards {
            policy_id: policy_id.clone(),
        },
        select_feed_route(&policy_id),
    ]);

    selector.select_feed(&mut store, &mut navigator, &target)?;

    assert_eq!(
        store.writes(),
        &[(
            last_selected_feed_key(&policy_id),
            Some(json!(target.feed_key.as_str()))
        )]
    );
    assert_eq!(
        navigator.calls(),
        &[NavigationCall::GoBack(Route::CompanyCards {
            policy_id: policy_id.clone()
        })]
    );
    assert_eq!(
        navigator.active_route(),
        format!("settings/workspaces/{policy_id}/company-cards")
    );
    Ok(())
}

#[test]
fn selection_follows_store_after_refresh() -> Result<()> {
    let mut store = MemoryStore::new();
    let fixture = WorkspaceFaker::new(5).workspace(PolicyKind::Team, 5);
    fixture.seed(&mut store)?;

    let policy_id = fixture.policy.id.clone();
    let mut selector = FeedSelector::open(&store, &policy_id)?;
    assert!(selector.items().iter().all(|item| !item.is_selected));
    assert_eq!(
        selector.initially_focused_feed(),
        fixture.feed_keys().first()
    );

    for item in selector.items().to_vec() {
        let mut navigator = RecordingNavigator::at(&select_feed_route(&policy_id));
        selector.select_feed(&mut store, &mut navigator, &item)?;
        selector.refresh(&store)?;

        let selected: Vec<&FeedKey> = selector
            .items()
            .iter()
            .filter(|entry| entry.is_selected)
            .map(|entry| &entry.feed_key)
            .collect();
        assert_eq!(selected, vec![&item.feed_key]);
        assert_eq!(selector.initially_focused_feed(), Some(&item.feed_key));
    }
    Ok(())
}

#[test]
fn stale_selection_marks_nothing() -> Result<()> {
    let mut store = MemoryStore::new();
    let fixture = WorkspaceFaker::new(8).workspace(PolicyKind::Corporate, 3);
    fixture.seed(&mut store)?;
    write_json(
        &mut store,
        &last_selected_feed_key(&fixture.policy.id),
        &FeedKey::from("removed.feed"),
    )?;

    let selector = FeedSelector::open(&store, &fixture.policy.id)?;
    assert!(selector.items().iter().all(|item| !item.is_selected));
    assert_eq!(
        selector.initially_focused_feed(),
        Some(&FeedKey::from("removed.feed"))
    );
    Ok(())
}

#[test]
fn items_keep_upstream_order() -> Result<()> {
    let mut store = MemoryStore::new();
    let fixture = WorkspaceFaker::new(21).workspace(PolicyKind::Corporate, 7);
    fixture.seed(&mut store)?;

    let selector = FeedSelector::open(&store, &fixture.policy.id)?;
    let listed: Vec<FeedKey> = selector
        .items()
        .iter()
        .map(|item| item.feed_key.clone())
        .collect();
    assert_eq!(listed, fixture.feed_keys());
    Ok(())
}

#[test]
fn add_feed_upsells_single_feed_collect_workspace() -> Result<()> {
    let mut store = MemoryStore::new();
    let fixture = WorkspaceFaker::new(13).workspace(PolicyKind::Collect, 1);
    fixture.seed(&mut store)?;
    store.write(ADD_NEW_CARD_FLOW_KEY, Some(json!({"step": "selectBank"})))?;
    store.clear_writes();

    let policy_id = fixture.policy.id.clone();
    let selector = FeedSelector::open(&store, &policy_id)?;
    let mut navigator = RecordingNavigator::at(&select_feed_route(&policy_id));
    let route = selector.add_feed(&mut store, &mut navigator)?;

    let expected = Route::WorkspaceUpgrade {
        policy_id: policy_id.clone(),
        feature: COMPANY_CARDS_FEATURE.to_owned(),
        back_to: Box::new(select_feed_route(&policy_id)),
    };
    assert_eq!(route, expected);
    assert_eq!(navigator.calls(), &[NavigationCall::Navigate(expected)]);
    assert_eq!(store.writes(), &[(ADD_NEW_CARD_FLOW_KEY.to_owned(), None)]);
    assert!(!store.keys().contains(&ADD_NEW_CARD_FLOW_KEY));
    Ok(())
}

#[test]
fn add_feed_uses_generic_flow_otherwise() -> Result<()> {
    for (seed, kind, feeds) in [
        (31, PolicyKind::Collect, 2),
        (32, PolicyKind::Collect, 0),
        (33, PolicyKind::Corporate, 1),
        (34, PolicyKind::Team, 3),
    ] {
        let mut store = MemoryStore::new();
        let fixture = WorkspaceFaker::new(seed).workspace(kind, feeds);
        fixture.seed(&mut store)?;

        let policy_id = fixture.policy.id.clone();
        let selector = FeedSelector::open(&store, &policy_id)?;
        let mut navigator = RecordingNavigator::at(&select_feed_route(&policy_id));
        let route = selector.add_feed(&mut store, &mut navigator)?;
        assert_eq!(
            route,
            Route::CompanyCardsAddNew {
                policy_id: policy_id.clone()
            },
            "{kind:?} with {feeds} feeds"
        );
    }
    Ok(())
}

#[test]
fn open_requires_known_policy_with_company_cards() -> Result<()> {
    let store = MemoryStore::new();
    let error = FeedSelector::open(&store, &PolicyId::from("MISSING"))
        .expect_err("unknown policy should fail");
    assert!(error.to_string().contains("not found"));

    let mut store = MemoryStore::new();
    let mut fixture = WorkspaceFaker::new(41).workspace(PolicyKind::Corporate, 2);
    fixture.policy.are_company_cards_enabled = false;
    fixture.seed(&mut store)?;
    let error = FeedSelector::open(&store, &fixture.policy.id)
        .expect_err("disabled feature should fail");
    assert!(error.to_string().contains("not enabled"));
    Ok(())
}

#[test]
fn cards_are_read_from_the_feed_domain_account() -> Result<()> {
    let mut store = MemoryStore::new();
    let mut faker = WorkspaceFaker::new(55);
    let mut fixture = faker.workspace(PolicyKind::Corporate, 1);
    let feed = fixture.feed_keys()[0].clone();
    let domain = AccountId::new(77);

    fixture.card_feeds.company_cards[0].settings = FeedSettings {
        domain_id: Some(domain),
        pending_action: None,
        connection_broken: false,
    };
    let failing = vec![faker.card(&feed, CardState::Open, Some(403))];
    fixture.cards.insert(feed.clone(), failing);
    fixture.seed(&mut store)?;

    assert!(
        store
            .keys()
            .contains(&format!("cards_77_{feed}").as_str())
    );
    let selector = FeedSelector::open(&store, &fixture.policy.id)?;
    assert!(selector.items()[0].has_broken_connection);
    assert_eq!(read_last_selected_feed(&store, &fixture.policy.id)?, None);
    Ok(())
}
