use super::table::Tabular;
use crate::api::models::{
    Account, AccountBalance, BankAccount, Company, Contact, InboxDocument, Invoice, JournalEntry,
    Purchase, Sale, Transaction,
};
use crate::utils::text::{format_amount, or_empty, yes_no};

impl Tabular for Company {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "SLUG", "ORG.NR", "VAT TYPE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.slug.clone(),
            or_empty(&self.organization_number).to_string(),
            or_empty(&self.vat_type).to_string(),
        ]
    }
}

impl Tabular for Account {
    fn headers() -> Vec<&'static str> {
        vec!["CODE", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.code.clone(), self.name.clone()]
    }
}

impl Tabular for AccountBalance {
    fn headers() -> Vec<&'static str> {
        vec!["CODE", "NAME", "BALANCE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.account.code.clone(),
            self.account.name.clone(),
            format_amount(self.balance),
        ]
    }
}

impl Tabular for BankAccount {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "ACCOUNT", "BANK ACCOUNT", "TYPE", "ACTIVE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.bank_account_id.to_string(),
            self.name.clone(),
            self.account_code.clone(),
            or_empty(&self.bank_account_number).to_string(),
            or_empty(&self.kind).to_string(),
            yes_no(!self.inactive).to_string(),
        ]
    }
}

impl Tabular for InboxDocument {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "FILENAME", "STATUS", "DATE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.document_id.to_string(),
            self.name.clone(),
            or_empty(&self.filename).to_string(),
            or_empty(&self.status).to_string(),
            self.created_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]
    }
}

impl Tabular for Purchase {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DATE", "KIND", "PAID", "AMOUNT", "IDENTIFIER"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.purchase_id.to_string(),
            self.date.clone(),
            self.kind.clone(),
            yes_no(self.paid).to_string(),
            format_amount(self.net_total()),
            or_empty(&self.identifier).to_string(),
        ]
    }
}

impl Tabular for Sale {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DATE", "KIND", "CUSTOMER", "PAID", "AMOUNT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.sale_id.to_string(),
            self.date.clone(),
            self.kind.clone(),
            self.customer
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            yes_no(self.paid).to_string(),
            format_amount(self.net_total()),
        ]
    }
}

impl Tabular for Invoice {
    fn headers() -> Vec<&'static str> {
        vec!["NUMBER", "ISSUED", "DUE", "CUSTOMER", "GROSS", "PAID"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.invoice_number.to_string(),
            self.issue_date.clone(),
            self.due_date.clone(),
            self.customer
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            format_amount(self.gross),
            yes_no(self.paid).to_string(),
        ]
    }
}

impl Tabular for Contact {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "EMAIL", "ORG.NR", "ROLE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.contact_id.to_string(),
            self.name.clone(),
            or_empty(&self.email).to_string(),
            or_empty(&self.organization_number).to_string(),
            self.role().to_string(),
        ]
    }
}

impl Tabular for JournalEntry {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DATE", "DESCRIPTION", "LINES", "DEBIT"]
    }

    fn row(&self) -> Vec<String> {
        let debit: i64 = self.lines.iter().filter_map(|l| l.debit_amount).sum();
        vec![
            self.journal_entry_id.to_string(),
            self.date.clone(),
            or_empty(&self.description).to_string(),
            self.lines.len().to_string(),
            format_amount(debit),
        ]
    }
}

impl Tabular for Transaction {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DATE", "TYPE", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.transaction_id.to_string(),
            self.date.clone(),
            or_empty(&self.kind).to_string(),
            or_empty(&self.description).to_string(),
        ]
    }
}
