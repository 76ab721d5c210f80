pub const BASE_URL: &str = "https://api.fiken.no/api/v2";

pub const COMPANIES: &str = "/companies";

/// Collections that live under `/companies/{slug}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyResource {
    Accounts,
    AccountBalances,
    BankAccounts,
    Inbox,
    Purchases,
    Sales,
    Invoices,
    JournalEntries,
    Transactions,
    Contacts,
}

impl CompanyResource {
    pub fn segment(&self) -> &'static str {
        match self {
            CompanyResource::Accounts => "accounts",
            CompanyResource::AccountBalances => "accountBalances",
            CompanyResource::BankAccounts => "bankAccounts",
            CompanyResource::Inbox => "inbox",
            CompanyResource::Purchases => "purchases",
            CompanyResource::Sales => "sales",
            CompanyResource::Invoices => "invoices",
            CompanyResource::JournalEntries => "journalEntries",
            CompanyResource::Transactions => "transactions",
            CompanyResource::Contacts => "contacts",
        }
    }

    pub fn path(&self, slug: &str) -> String {
        format!("{}/{}/{}", COMPANIES, slug, self.segment())
    }
}
