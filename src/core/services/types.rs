use crate::api::models::BankAccount;
use crate::error::ApiError;
use serde::Serialize;

/// Which contacts `contacts list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactFilter {
    #[default]
    All,
    Customers,
    Suppliers,
}

impl ContactFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ContactFilter::All => Vec::new(),
            ContactFilter::Customers => vec![("customer", "true".to_string())],
            ContactFilter::Suppliers => vec![("supplier", "true".to_string())],
        }
    }
}

/// Account range filter for `accounts`
#[derive(Debug, Clone, Default)]
pub struct AccountRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl AccountRange {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from.as_deref().filter(|s| !s.is_empty()) {
            params.push(("fromAccount", from.to_string()));
        }
        if let Some(to) = self.to.as_deref().filter(|s| !s.is_empty()) {
            params.push(("toAccount", to.to_string()));
        }
        params
    }
}

/// Outcome of the dashboard's sub-queries. Each line fails on its own.
#[derive(Debug)]
pub struct StatusReport {
    pub company: String,
    pub inbox: Result<u32, ApiError>,
    pub purchases: Result<u32, ApiError>,
    pub bank_accounts: Result<Vec<BankAccount>, ApiError>,
    pub contacts: Result<u32, ApiError>,
}

/// JSON shape of `fiken status --json`. Failed sub-queries count as zero.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusSummary {
    pub company: String,
    pub inbox_count: u32,
    pub purchase_count: u32,
    pub bank_accounts: u32,
    pub contact_count: u32,
}

impl StatusReport {
    pub fn summary(&self) -> StatusSummary {
        StatusSummary {
            company: self.company.clone(),
            inbox_count: *self.inbox.as_ref().unwrap_or(&0),
            purchase_count: *self.purchases.as_ref().unwrap_or(&0),
            bank_accounts: self
                .bank_accounts
                .as_ref()
                .map(|accounts| accounts.len() as u32)
                .unwrap_or(0),
            contact_count: *self.contacts.as_ref().unwrap_or(&0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_filter_query() {
        assert!(ContactFilter::All.query().is_empty());
        assert_eq!(
            ContactFilter::Suppliers.query(),
            vec![("supplier", "true".to_string())]
        );
    }

    #[test]
    fn test_account_range_skips_empty_bounds() {
        let range = AccountRange {
            from: Some("1000".to_string()),
            to: Some(String::new()),
        };
        assert_eq!(range.query(), vec![("fromAccount", "1000".to_string())]);
    }

    #[test]
    fn test_status_summary_counts_failures_as_zero() {
        let report = StatusReport {
            company: "acme".to_string(),
            inbox: Ok(3),
            purchases: Err(ApiError::ClientInit("x".to_string())),
            bank_accounts: Ok(vec![BankAccount::default(), BankAccount::default()]),
            contacts: Ok(12),
        };
        assert_eq!(
            report.summary(),
            StatusSummary {
                company: "acme".to_string(),
                inbox_count: 3,
                purchase_count: 0,
                bank_accounts: 2,
                contact_count: 12,
            }
        );
    }
}
