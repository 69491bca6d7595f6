// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use url::form_urlencoded;

use crate::{IouType, PolicyId, ReportId, TransactionId};

/// Path segment that marks a tax amount entry.
pub const TAX_AMOUNT_MARKER: &str = "taxAmount";

/// Feature alias used by the upgrade flow for company cards.
pub const COMPANY_CARDS_FEATURE: &str = "companyCards";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IouAction {
    Create,
    Edit,
}

impl IouAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CompanyCards {
        policy_id: PolicyId,
    },
    CompanyCardsSelectFeed {
        policy_id: PolicyId,
    },
    CompanyCardsAddNew {
        policy_id: PolicyId,
    },
    WorkspaceUpgrade {
        policy_id: PolicyId,
        feature: String,
        back_to: Box<Route>,
    },
    MoneyRequestAmount {
        action: IouAction,
        iou_type: IouType,
        transaction_id: TransactionId,
        report_id: ReportId,
    },
    MoneyRequestTaxAmount {
        action: IouAction,
        iou_type: IouType,
        transaction_id: TransactionId,
        report_id: ReportId,
    },
    SendEnablePayments,
    SendAddDebitCard,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::CompanyCards { policy_id } => {
                format!("settings/workspaces/{policy_id}/company-cards")
            }
            Self::CompanyCardsSelectFeed { policy_id } => {
                format!("settings/workspaces/{policy_id}/company-cards/select-feed")
            }
            Self::CompanyCardsAddNew { policy_id } => {
                format!("settings/workspaces/{policy_id}/company-cards/add-card-feed")
            }
            Self::WorkspaceUpgrade {
                policy_id,
                feature,
                back_to,
            } => {
                let back_to = form_urlencoded::byte_serialize(back_to.path().as_bytes())
                    .collect::<String>();
                format!("settings/workspaces/{policy_id}/upgrade/{feature}?backTo={back_to}")
            }
            Self::MoneyRequestAmount {
                action,
                iou_type,
                transaction_id,
                report_id,
            } => format!(
                "{}/{}/amount/{transaction_id}/{report_id}",
                action.as_str(),
                iou_type.as_str()
            ),
            Self::MoneyRequestTaxAmount {
                action,
                iou_type,
                transaction_id,
                report_id,
            } => format!(
                "{}/{}/{TAX_AMOUNT_MARKER}/{transaction_id}/{report_id}",
                action.as_str(),
                iou_type.as_str()
            ),
            Self::SendEnablePayments => "send/enable-payments".to_owned(),
            Self::SendAddDebitCard => "send/add-debit-card".to_owned(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub fn is_tax_amount_route(active_route: &str) -> bool {
    active_route.contains(TAX_AMOUNT_MARKER)
}
