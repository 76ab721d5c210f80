use super::ledger_service::LedgerService;
use super::types::StatusReport;
use crate::api::endpoints::CompanyResource;

/// Dashboard overview of one company
pub struct StatusService<'a> {
    ledger: &'a LedgerService,
}

impl<'a> StatusService<'a> {
    pub fn new(ledger: &'a LedgerService) -> Self {
        Self { ledger }
    }

    /// Run the four dashboard queries concurrently.
    ///
    /// They share the client's rate limiter, so they still reach the API one
    /// interval apart. A failing query only affects its own line.
    pub async fn report(&self) -> StatusReport {
        let (inbox, purchases, bank_accounts, contacts) = futures::join!(
            self.ledger.count(CompanyResource::Inbox),
            self.ledger.count(CompanyResource::Purchases),
            self.ledger.bank_accounts(),
            self.ledger.count(CompanyResource::Contacts),
        );

        StatusReport {
            company: self.ledger.company().to_string(),
            inbox,
            purchases,
            bank_accounts,
            contacts,
        }
    }
}
