//! API entities the CLI decodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity identifiers are numeric on the legacy API and strings on v4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// An OpenX account. Only the commonly used fields are decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub account_id: Option<EntityId>,
    #[serde(default)]
    pub currency_id: Option<EntityId>,
    #[serde(default)]
    pub timezone_id: Option<EntityId>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
}

/// Account list: a bare array (legacy) or an `objects` page (v4).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountList {
    Page { objects: Vec<Account> },
    Plain(Vec<Account>),
}

impl AccountList {
    pub fn into_accounts(self) -> Vec<Account> {
        match self {
            AccountList::Page { objects } => objects,
            AccountList::Plain(accounts) => accounts,
        }
    }
}
