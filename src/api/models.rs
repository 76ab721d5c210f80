use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fiken sends `null` for some numeric fields it otherwise omits.
fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

// Company models
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub name: String,
    pub slug: String,
    pub organization_number: Option<String>,
    pub vat_type: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub creation_date: Option<String>,
    pub has_api_access: bool,
    pub test_company: bool,
    pub accounting_start_date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address_line2: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub country: Option<String>,
}

// Ledger models
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Balance in cents as of the requested date.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountBalance {
    pub account: Account,
    #[serde(deserialize_with = "null_as_zero")]
    pub balance: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BankAccount {
    pub bank_account_id: i64,
    pub name: String,
    pub account_code: String,
    pub bank_account_number: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub foreign_service: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub inactive: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InboxDocument {
    pub document_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub filename: Option<String>,
    pub status: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}

// Purchase and sale models. All amounts are in cents.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    pub description: Option<String>,
    pub account: Option<String>,
    #[serde(deserialize_with = "null_as_zero")]
    pub net_amount: i64,
    #[serde(deserialize_with = "null_as_zero")]
    pub vat_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_amount_in_currency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount_in_currency: Option<i64>,
    pub vat_type: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Purchase {
    pub purchase_id: i64,
    pub transaction_id: Option<i64>,
    pub identifier: Option<String>,
    pub date: String,
    pub due_date: Option<String>,
    pub kind: String,
    pub lines: Vec<OrderLine>,
    pub supplier: Option<Contact>,
    pub currency: Option<String>,
    pub payment_account: Option<String>,
    pub paid: bool,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_paid: i64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_paid_in_currency: i64,
}

impl Purchase {
    pub fn net_total(&self) -> i64 {
        self.lines.iter().map(|line| line.net_amount).sum()
    }
}

/// Body of `POST /companies/{slug}/purchases`.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub kind: String,
    pub lines: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<ContactRef>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Sale {
    pub sale_id: i64,
    pub date: String,
    pub kind: String,
    pub lines: Vec<OrderLine>,
    pub customer: Option<Contact>,
    pub currency: Option<String>,
    pub due_date: Option<String>,
    pub paid: bool,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_paid: i64,
}

impl Sale {
    pub fn net_total(&self) -> i64 {
        self.lines.iter().map(|line| line.net_amount).sum()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub invoice_id: i64,
    pub invoice_number: i64,
    pub issue_date: String,
    pub due_date: String,
    pub lines: Vec<OrderLine>,
    pub customer: Option<Contact>,
    #[serde(deserialize_with = "null_as_zero")]
    pub net: i64,
    #[serde(deserialize_with = "null_as_zero")]
    pub vat: i64,
    #[serde(deserialize_with = "null_as_zero")]
    pub gross: i64,
    pub currency: Option<String>,
    pub paid: bool,
    pub kid: Option<String>,
}

// Journal models
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalEntry {
    pub journal_entry_id: i64,
    pub date: String,
    pub description: Option<String>,
    pub lines: Vec<JournalLine>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalLine {
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_amount: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub transaction_id: i64,
    pub date: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub contact_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub organization_number: Option<String>,
    pub customer: bool,
    pub supplier: bool,
    pub phone_number: Option<String>,
    pub member_number: Option<i64>,
    pub address: Option<Address>,
    pub language: Option<String>,
    pub inactive: bool,
}

impl Contact {
    pub fn role(&self) -> &'static str {
        match (self.customer, self.supplier) {
            (true, true) => "customer, supplier",
            (true, false) => "customer",
            (false, true) => "supplier",
            (false, false) => "",
        }
    }
}
