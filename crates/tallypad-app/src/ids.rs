// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(PolicyId);
string_id!(FeedKey);
string_id!(TransactionId);
string_id!(ReportId);

numeric_id!(CardId);
numeric_id!(AccountId);

impl FeedKey {
    const PLAID_PREFIX: &'static str = "plaid.";

    /// Institution id for feeds connected through Plaid (`plaid.<institution>`).
    pub fn plaid_institution_id(&self) -> Option<&str> {
        self.0
            .strip_prefix(Self::PLAID_PREFIX)
            .filter(|institution| !institution.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountId, FeedKey};

    #[test]
    fn plaid_institution_is_extracted_from_prefixed_feeds() {
        assert_eq!(
            FeedKey::from("plaid.ins_19").plaid_institution_id(),
            Some("ins_19")
        );
        assert_eq!(FeedKey::from("plaid.").plaid_institution_id(), None);
        assert_eq!(FeedKey::from("vcf").plaid_institution_id(), None);
    }

    #[test]
    fn ids_serialize_transparently() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&FeedKey::from("cdf"))?, "\"cdf\"");
        assert_eq!(serde_json::to_string(&AccountId::new(42))?, "42");
        Ok(())
    }
}
