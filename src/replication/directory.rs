use serde::{Deserialize, Serialize};

/// Venue account classes that matter to token resolution.
///
/// `Financial` accounts authenticate replicated trades under their linked
/// demo identity, so master-token resolution routes through the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountClass {
    Standard,
    Financial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub token: String,
    pub is_virtual: bool,
    pub class: AccountClass,
    pub linked_account_id: Option<String>,
}

/// Read-only view of the account/credential directory
pub trait AccountDirectory: Send + Sync {
    /// The account currently driving the bot
    fn active_account_id(&self) -> Option<String>;

    fn accounts(&self) -> Vec<AccountRecord>;

    fn token_for(&self, account_id: &str) -> Option<String> {
        self.accounts()
            .into_iter()
            .find(|a| a.account_id == account_id)
            .map(|a| a.token)
    }
}

/// Directory backed by a plain list, for tests and the demo binary
#[derive(Clone)]
pub struct InMemoryDirectory {
    active: Option<String>,
    accounts: Vec<AccountRecord>,
}

impl InMemoryDirectory {
    pub fn new(active: Option<&str>, accounts: Vec<AccountRecord>) -> Self {
        Self {
            active: active.map(str::to_string),
            accounts,
        }
    }
}

impl AccountDirectory for InMemoryDirectory {
    fn active_account_id(&self) -> Option<String> {
        self.active.clone()
    }

    fn accounts(&self) -> Vec<AccountRecord> {
        self.accounts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, token: &str) -> AccountRecord {
        AccountRecord {
            account_id: id.to_string(),
            token: token.to_string(),
            is_virtual: false,
            class: AccountClass::Standard,
            linked_account_id: None,
        }
    }

    #[test]
    fn test_token_for_scans_accounts() {
        let dir = InMemoryDirectory::new(
            Some("CR100"),
            vec![record("CR100", "tok-a"), record("CR200", "tok-b")],
        );

        assert_eq!(dir.token_for("CR200"), Some("tok-b".to_string()));
        assert_eq!(dir.token_for("CR999"), None);
    }

    #[test]
    fn test_active_account() {
        let dir = InMemoryDirectory::new(None, vec![]);
        assert_eq!(dir.active_account_id(), None);
    }
}
