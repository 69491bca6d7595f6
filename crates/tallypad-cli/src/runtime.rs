// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use tallypad_app::store::last_selected_feed_key;
use tallypad_app::{
    AmountContext, AmountEditor, Currency, EditorCommand, EditorKey, FeedKey, FeedSelector,
    IouAction, IouType, KeyValueStore, Navigator, PaymentMethod, PolicyId, ReportId, Route,
    SubmitOptions, SubscriptionId, TransactionId,
};
use tracing::info;

/// Navigator for a headless session: keeps a path stack and logs moves.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNavigator {
    stack: Vec<String>,
}

impl ConsoleNavigator {
    pub fn at(route: &Route) -> Self {
        Self {
            stack: vec![route.path()],
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn active_route(&self) -> String {
        self.stack.last().cloned().unwrap_or_default()
    }

    fn navigate(&mut self, route: Route) -> Result<()> {
        let path = route.path();
        info!(to = %path, "navigate");
        self.stack.push(path);
        Ok(())
    }

    fn go_back(&mut self, fallback: Route) -> Result<()> {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            self.stack = vec![fallback.path()];
        }
        info!(to = %self.active_route(), "go back");
        Ok(())
    }
}

/// Logs every change to the workspace's last selected feed.
pub fn watch_selected_feed<S>(store: &mut S, policy_id: &PolicyId) -> SubscriptionId
where
    S: KeyValueStore + ?Sized,
{
    let key = last_selected_feed_key(policy_id);
    store.subscribe(
        &key,
        Box::new(|key: &str, value: Option<&Value>| {
            info!(key, value = ?value, "store changed");
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountArgs {
    pub keys: String,
    pub currency: Option<String>,
    pub initial: i64,
    pub tax_max: Option<i64>,
    pub iou_type: IouType,
    pub payment_method: Option<PaymentMethod>,
    pub is_editing: bool,
    pub skip_confirmation: bool,
}

impl Default for AmountArgs {
    fn default() -> Self {
        Self {
            keys: String::new(),
            currency: None,
            initial: 0,
            tax_max: None,
            iou_type: IouType::Submit,
            payment_method: None,
            is_editing: false,
            skip_confirmation: false,
        }
    }
}

/// Replays keypad presses through a fresh editor, then submits once.
pub fn run_amount(args: &AmountArgs, default_currency: Currency) -> Result<Value> {
    let currency = match &args.currency {
        Some(code) => Currency::parse(code)
            .ok_or_else(|| anyhow!("invalid currency {code:?}; pass a three-letter ISO code"))?,
        None => default_currency,
    };

    let action = if args.is_editing {
        IouAction::Edit
    } else {
        IouAction::Create
    };
    let transaction_id = TransactionId::from("1");
    let report_id = ReportId::from("0");
    let route = match args.tax_max {
        Some(_) => Route::MoneyRequestTaxAmount {
            action,
            iou_type: args.iou_type,
            transaction_id,
            report_id,
        },
        None => Route::MoneyRequestAmount {
            action,
            iou_type: args.iou_type,
            transaction_id,
            report_id,
        },
    };
    let navigator = ConsoleNavigator::at(&route);

    let mut editor = AmountEditor::new(args.initial, currency);
    editor.dispatch(EditorCommand::FieldFocusChanged(true));
    for key in keypad_keys(&args.keys) {
        editor.dispatch(EditorCommand::Key(EditorKey::parse(&key)));
    }

    let context = AmountContext::from_route(&navigator.active_route(), args.tax_max.unwrap_or(0));
    editor.dispatch(EditorCommand::Submit {
        context,
        payment_method: args.payment_method,
    });

    let options = SubmitOptions {
        skip_confirmation: args.skip_confirmation,
        iou_type: args.iou_type,
        is_editing: args.is_editing,
    };
    let selection = editor.selection();
    let mut output = json!({
        "route": navigator.active_route(),
        "buffer": editor.buffer(),
        "currency": editor.currency(),
        "selection": { "start": selection.start, "end": selection.end },
        "submitLabel": options.label().as_str(),
        "usesSettlementButton": options.uses_settlement_button(),
    });
    if let Some(error) = editor.form_error() {
        output["error"] = json!(error.to_string());
    }
    if let tallypad_app::EditorPhase::Accepted(money) = editor.phase() {
        output["accepted"] = serde_json::to_value(money)?;
    }
    Ok(output)
}

/// Splits a keypad script into presses; `<` is backspace.
fn keypad_keys(script: &str) -> Vec<String> {
    script.chars().map(String::from).collect()
}

pub fn run_feeds<S>(store: &S, policy_id: &PolicyId) -> Result<Value>
where
    S: KeyValueStore + ?Sized,
{
    let selector = FeedSelector::open(store, policy_id)?;
    Ok(json!({
        "policyId": selector.policy().id,
        "initiallyFocused": selector.initially_focused_feed(),
        "feeds": selector.items(),
    }))
}

pub fn run_select_feed<S>(store: &mut S, policy_id: &PolicyId, feed: &FeedKey) -> Result<Value>
where
    S: KeyValueStore + ?Sized,
{
    let selector = FeedSelector::open(store, policy_id)?;
    let item = selector
        .items()
        .iter()
        .find(|item| &item.feed_key == feed)
        .cloned()
        .ok_or_else(|| {
            anyhow!("feed {feed} is not connected to workspace {policy_id}; run `tallypad feeds {policy_id}` to list feeds")
        })?;

    let mut navigator = ConsoleNavigator::at(&Route::CompanyCardsSelectFeed {
        policy_id: policy_id.clone(),
    });
    selector.select_feed(store, &mut navigator, &item)?;
    Ok(json!({
        "selected": item.feed_key,
        "route": navigator.active_route(),
    }))
}

pub fn run_add_feed<S>(store: &mut S, policy_id: &PolicyId) -> Result<Value>
where
    S: KeyValueStore + ?Sized,
{
    let selector = FeedSelector::open(store, policy_id)?;
    let mut navigator = ConsoleNavigator::at(&Route::CompanyCardsSelectFeed {
        policy_id: policy_id.clone(),
    });
    let route = selector.add_feed(store, &mut navigator)?;
    Ok(json!({ "route": route.path() }))
}
