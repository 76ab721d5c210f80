use super::types::{AccountRange, ContactFilter};
use crate::api::client::FikenClient;
use crate::api::endpoints::CompanyResource;
use crate::api::models::{
    Account, AccountBalance, BankAccount, Contact, InboxDocument, Invoice, JournalEntry, Purchase,
    PurchaseRequest, Sale, Transaction,
};
use crate::api::pagination::{MAX_PAGE_SIZE, Page};
use crate::error::ApiError;
use chrono::NaiveDate;
use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

/// Read and write access to one company's books
pub struct LedgerService {
    client: FikenClient,
    slug: String,
    page_size: u32,
}

impl LedgerService {
    pub fn new(client: FikenClient, slug: String, page_size: u32) -> Self {
        Self {
            client,
            slug,
            page_size,
        }
    }

    pub fn company(&self) -> &str {
        &self.slug
    }

    fn path(&self, resource: CompanyResource) -> String {
        resource.path(&self.slug)
    }

    async fn list_all<T: DeserializeOwned>(
        &self,
        resource: CompanyResource,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        self.client
            .get_all(&self.path(resource), params, self.page_size as i64)
            .await
    }

    /// Chart of accounts, fetched in pages of 100.
    pub async fn accounts(&self, range: &AccountRange) -> Result<Vec<Account>, ApiError> {
        self.client
            .get_all(
                &self.path(CompanyResource::Accounts),
                &range.query(),
                MAX_PAGE_SIZE as i64,
            )
            .await
    }

    pub async fn balances(&self, date: NaiveDate) -> Result<Vec<AccountBalance>, ApiError> {
        let params = [("date", date.format("%Y-%m-%d").to_string())];
        self.list_all(CompanyResource::AccountBalances, &params).await
    }

    pub async fn bank_accounts(&self) -> Result<Vec<BankAccount>, ApiError> {
        self.list_all(CompanyResource::BankAccounts, &[]).await
    }

    pub async fn inbox(&self, status: Option<&str>) -> Result<Vec<InboxDocument>, ApiError> {
        let params: Vec<(&str, String)> = status
            .filter(|s| !s.is_empty())
            .map(|s| ("status", s.to_string()))
            .into_iter()
            .collect();
        self.list_all(CompanyResource::Inbox, &params).await
    }

    /// Purchases from the first `max_pages` pages. `0` fetches every page.
    pub async fn purchases(&self, page_size: i64, max_pages: u32) -> Result<Vec<Purchase>, ApiError> {
        let path = self.path(CompanyResource::Purchases);
        let limit = if max_pages == 0 {
            usize::MAX
        } else {
            max_pages as usize
        };

        let pages: Vec<Page<Purchase>> = self
            .client
            .pages::<Purchase>(&path, &[], page_size)
            .take(limit)
            .try_collect()
            .await?;

        Ok(pages.into_iter().flat_map(|page| page.items).collect())
    }

    /// Create a purchase and return the `Location` of the new resource.
    pub async fn create_purchase(
        &self,
        request: &PurchaseRequest,
    ) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .post(&self.path(CompanyResource::Purchases), request)
            .await?;
        Ok(response.location)
    }

    pub async fn sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.list_all(CompanyResource::Sales, &[]).await
    }

    pub async fn invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        self.list_all(CompanyResource::Invoices, &[]).await
    }

    pub async fn contacts(&self, filter: ContactFilter) -> Result<Vec<Contact>, ApiError> {
        self.list_all(CompanyResource::Contacts, &filter.query()).await
    }

    pub async fn journal_entries(&self) -> Result<Vec<JournalEntry>, ApiError> {
        self.list_all(CompanyResource::JournalEntries, &[]).await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.list_all(CompanyResource::Transactions, &[]).await
    }

    /// Total size of a collection, read from one single-item page.
    pub async fn count(&self, resource: CompanyResource) -> Result<u32, ApiError> {
        let (items, pagination): (Vec<serde_json::Value>, _) = self
            .client
            .get_with_params(&self.path(resource), &[("pageSize", "1".to_string())])
            .await?;
        Ok(pagination.result_count.max(items.len() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::OrderLine;
    use crate::api::pagination::{HEADER_PAGE_COUNT, HEADER_RESULT_COUNT};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ledger(server: &MockServer) -> LedgerService {
        let client = FikenClient::new("t".to_string())
            .unwrap()
            .with_base_url(&server.uri())
            .with_min_delay(Duration::ZERO);
        LedgerService::new(client, "acme".to_string(), 25)
    }

    #[tokio::test]
    async fn test_accounts_use_page_size_100_and_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/acme/accounts"))
            .and(query_param("pageSize", "100"))
            .and(query_param("fromAccount", "3000"))
            .and(query_param("toAccount", "3999"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "code": "3000", "name": "Salgsinntekt" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let range = AccountRange {
            from: Some("3000".to_string()),
            to: Some("3999".to_string()),
        };
        let accounts = ledger(&server).accounts(&range).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Salgsinntekt");
    }

    #[tokio::test]
    async fn test_balances_send_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/acme/accountBalances"))
            .and(query_param("date", "2024-06-30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "account": { "code": "1920", "name": "Bank" }, "balance": 123456 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let balances = ledger(&server).balances(date).await.unwrap();
        assert_eq!(balances[0].balance, 123456);
    }

    #[tokio::test]
    async fn test_purchases_stop_at_max_pages() {
        let server = MockServer::start().await;
        for page in 0..2 {
            Mock::given(method("GET"))
                .and(path("/companies/acme/purchases"))
                .and(query_param("page", page.to_string().as_str()))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{ "purchaseId": page, "date": "2024-01-01", "kind": "cash_purchase" }]))
                        .insert_header(HEADER_PAGE_COUNT, "9"),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let purchases = ledger(&server).purchases(1, 2).await.unwrap();
        let ids: Vec<i64> = purchases.iter().map(|p| p.purchase_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_create_purchase_returns_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/companies/acme/purchases"))
            .and(body_partial_json(json!({ "date": "2024-05-01", "currency": "NOK" })))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", "/purchases/77"))
            .expect(1)
            .mount(&server)
            .await;

        let request = PurchaseRequest {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: None,
            kind: "cash_purchase".to_string(),
            lines: vec![OrderLine {
                account: Some("6800".to_string()),
                net_amount: 10000,
                vat_type: "HIGH".to_string(),
                ..Default::default()
            }],
            supplier: None,
            currency: "NOK".to_string(),
            payment_account: None,
            identifier: None,
        };
        let location = ledger(&server).create_purchase(&request).await.unwrap();
        assert_eq!(location.as_deref(), Some("/purchases/77"));
    }

    #[tokio::test]
    async fn test_count_reads_result_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/acme/contacts"))
            .and(query_param("pageSize", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "contactId": 1 }]))
                    .insert_header(HEADER_RESULT_COUNT, "42"),
            )
            .mount(&server)
            .await;

        let count = ledger(&server)
            .count(CompanyResource::Contacts)
            .await
            .unwrap();
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn test_contacts_filter_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/acme/contacts"))
            .and(query_param("customer", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "contactId": 5, "name": "Kari", "customer": true }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let contacts = ledger(&server)
            .contacts(ContactFilter::Customers)
            .await
            .unwrap();
        assert_eq!(contacts[0].role(), "customer");
    }
}
