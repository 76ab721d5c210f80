use crate::api::models::{BankAccount, OrderLine, PurchaseRequest};
use crate::api::pagination::clamp_page_size;
use crate::cli::dispatcher::{Dispatcher, GlobalOptions};
use crate::cli::main_types::{
    AuthCommands, CompaniesCommands, ConfigCommands, CreatePurchaseArgs, PurchasesCommands,
};
use crate::core::auth::TokenInput;
use crate::core::services::company_service::CompanyService;
use crate::core::services::status_service::StatusService;
use crate::core::services::types::{AccountRange, ContactFilter};
use crate::display::{
    ProgressSpinner, TableDisplay, Tabular, count_footer, print_error, print_info, print_json,
    print_success,
};
use crate::error::{AppError, CliError, OperationContext};
use crate::storage::config::Config;
use crate::storage::credentials::mask_token;
use crate::utils::text::or_empty;
use crate::utils::validation::{parse_amount, parse_date};
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;
use std::future::Future;
use std::io;

/// Await `future` behind a spinner on stderr.
async fn with_spinner<F: Future>(message: &str, enabled: bool, future: F) -> F::Output {
    let mut spinner = ProgressSpinner::new(message, enabled);
    spinner.start();
    let output = future.await;
    spinner.stop();
    output
}

/// JSON array under `--json`, otherwise a table with a count footer.
fn print_list<T: Tabular + Serialize>(
    options: &GlobalOptions,
    items: &[T],
    noun: &str,
    empty_message: &str,
) -> Result<(), AppError> {
    if options.json {
        return print_json(items);
    }
    if items.is_empty() {
        print_info(empty_message);
        return Ok(());
    }
    println!("{}", TableDisplay::new().render_items(items));
    println!("{}", count_footer(items.len(), noun));
    Ok(())
}

pub struct AuthHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> AuthHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, command: AuthCommands) -> Result<(), AppError> {
        match command {
            AuthCommands::Token { token, stdin } => {
                let input = if stdin {
                    self.ctx.print_verbose("Reading token from stdin");
                    TokenInput::from_reader(io::stdin().lock())?
                } else {
                    match token {
                        Some(token) => TokenInput::from_arg(&token),
                        None => return self.show_token(),
                    }
                };
                self.save(input)
            }
            AuthCommands::Login => {
                if self.ctx.options().no_input {
                    return Err(CliError::InputRequired {
                        command: "auth login".to_string(),
                    }
                    .into());
                }
                self.save(TokenInput::prompt()?)
            }
            AuthCommands::Logout => {
                self.ctx.credentials().remove_token()?;
                print_success("Token removed");
                Ok(())
            }
            AuthCommands::Status => self.status().await,
        }
    }

    fn show_token(&self) -> Result<(), AppError> {
        if self.ctx.credentials().has_token() {
            let token = self.ctx.credentials().load_token()?;
            print_success(&format!("Token configured: {}", mask_token(&token)));
        } else {
            print_info("No token configured. Run 'fiken auth token <token>' to authenticate.");
        }
        Ok(())
    }

    fn save(&self, input: TokenInput) -> Result<(), AppError> {
        input.validate()?;
        self.ctx.credentials().save_token(&input.token)?;
        print_success(&format!(
            "Token saved to {} storage",
            self.ctx.backend()
        ));
        Ok(())
    }

    async fn status(&self) -> Result<(), AppError> {
        let has_token =
            self.ctx.options().token_override().is_some() || self.ctx.credentials().has_token();
        if !has_token {
            if self.ctx.options().json {
                return print_json(&json!({ "authenticated": false }));
            }
            print_error("Not authenticated. Run 'fiken auth token <token>' to set up.");
            return Ok(());
        }

        let client = self.ctx.client()?;
        let result = with_spinner(
            "Checking token...",
            !self.ctx.options().json,
            CompanyService::new(client).list_companies(),
        )
        .await;

        match (result, self.ctx.options().json) {
            (Ok(companies), true) => print_json(&json!({
                "authenticated": true,
                "companies": companies.len(),
            })),
            (Ok(companies), false) => {
                print_success(&format!(
                    "Authenticated. Access to {} company(ies).",
                    companies.len()
                ));
                Ok(())
            }
            (Err(e), true) => print_json(&json!({
                "authenticated": false,
                "error": e.to_string(),
            })),
            (Err(e), false) => {
                print_error(&format!("Token is invalid or expired: {}", e));
                Ok(())
            }
        }
    }
}

pub struct CompaniesHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> CompaniesHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, command: Option<CompaniesCommands>) -> Result<(), AppError> {
        match command.unwrap_or(CompaniesCommands::List) {
            CompaniesCommands::List => self.list().await,
            CompaniesCommands::Default { slug: None } => {
                match self.ctx.credentials().default_company()? {
                    Some(slug) => println!("Default company: {}", slug),
                    None => print_info("No default company set."),
                }
                Ok(())
            }
            CompaniesCommands::Default { slug: Some(slug) } => {
                self.ctx.credentials().set_default_company(&slug)?;
                if slug.trim().is_empty() {
                    print_success("Default company cleared");
                } else {
                    print_success(&format!("Default company set to '{}'", slug.trim()));
                }
                Ok(())
            }
        }
    }

    async fn list(&self) -> Result<(), AppError> {
        let client = self.ctx.client()?;
        let options = self.ctx.options();
        let companies = with_spinner(
            "Fetching companies...",
            !options.json,
            CompanyService::new(client).list_companies(),
        )
        .await
        .operation("fetching companies")?;

        print_list(options, &companies, "companies", "No companies found.")?;

        if !options.json
            && companies.len() > 1
            && self.ctx.credentials().default_company()?.is_none()
        {
            println!("\nTip: Set default company with 'fiken companies default <slug>'");
        }
        Ok(())
    }
}

/// Read-only list commands scoped to one company
pub struct LedgerHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> LedgerHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    fn spinner_enabled(&self) -> bool {
        !self.ctx.options().json
    }

    pub async fn accounts(&self, range: AccountRange) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let accounts = with_spinner(
            "Fetching accounts...",
            self.spinner_enabled(),
            ledger.accounts(&range),
        )
        .await
        .operation("fetching accounts")?;
        print_list(self.ctx.options(), &accounts, "accounts", "No accounts found.")
    }

    pub async fn balances(&self, date: Option<String>) -> Result<(), AppError> {
        let date = match date.as_deref() {
            Some(value) => parse_date(value)?,
            None => chrono::Local::now().date_naive(),
        };
        self.ctx
            .print_verbose(&format!("Balances as of {}", date.format("%Y-%m-%d")));

        let ledger = self.ctx.ledger().await?;
        let balances = with_spinner(
            "Fetching balances...",
            self.spinner_enabled(),
            ledger.balances(date),
        )
        .await
        .operation("fetching balances")?;
        print_list(self.ctx.options(), &balances, "accounts", "No balances found.")
    }

    pub async fn bank_accounts(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let accounts = with_spinner(
            "Fetching bank accounts...",
            self.spinner_enabled(),
            ledger.bank_accounts(),
        )
        .await
        .operation("fetching bank accounts")?;
        print_list(
            self.ctx.options(),
            &accounts,
            "bank accounts",
            "No bank accounts found.",
        )
    }

    pub async fn inbox(&self, status: Option<String>) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let documents = with_spinner(
            "Fetching inbox...",
            self.spinner_enabled(),
            ledger.inbox(status.as_deref()),
        )
        .await
        .operation("fetching inbox")?;
        print_list(self.ctx.options(), &documents, "documents", "Inbox is empty.")
    }

    pub async fn sales(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let sales = with_spinner("Fetching sales...", self.spinner_enabled(), ledger.sales())
            .await
            .operation("fetching sales")?;
        print_list(self.ctx.options(), &sales, "sales", "No sales found.")
    }

    pub async fn invoices(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let invoices = with_spinner(
            "Fetching invoices...",
            self.spinner_enabled(),
            ledger.invoices(),
        )
        .await
        .operation("fetching invoices")?;
        print_list(self.ctx.options(), &invoices, "invoices", "No invoices found.")
    }

    pub async fn contacts(&self, filter: ContactFilter) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let contacts = with_spinner(
            "Fetching contacts...",
            self.spinner_enabled(),
            ledger.contacts(filter),
        )
        .await
        .operation("fetching contacts")?;
        print_list(self.ctx.options(), &contacts, "contacts", "No contacts found.")
    }

    pub async fn journal_entries(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let entries = with_spinner(
            "Fetching journal entries...",
            self.spinner_enabled(),
            ledger.journal_entries(),
        )
        .await
        .operation("fetching journal entries")?;
        print_list(
            self.ctx.options(),
            &entries,
            "journal entries",
            "No journal entries found.",
        )
    }

    pub async fn transactions(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let transactions = with_spinner(
            "Fetching transactions...",
            self.spinner_enabled(),
            ledger.transactions(),
        )
        .await
        .operation("fetching transactions")?;
        print_list(
            self.ctx.options(),
            &transactions,
            "transactions",
            "No transactions found.",
        )
    }
}

pub struct PurchasesHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> PurchasesHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, command: PurchasesCommands) -> Result<(), AppError> {
        match command {
            PurchasesCommands::List {
                page_size,
                max_pages,
            } => self.list(page_size, max_pages).await,
            PurchasesCommands::Create(args) => self.create(args).await,
        }
    }

    async fn list(&self, page_size: Option<i64>, max_pages: u32) -> Result<(), AppError> {
        let options = self.ctx.options();
        let page_size =
            page_size.unwrap_or_else(|| i64::from(self.ctx.config().effective_page_size()));
        self.ctx.print_verbose(&format!(
            "Fetching up to {} pages of {} purchases",
            max_pages,
            clamp_page_size(page_size)
        ));

        let ledger = self.ctx.ledger().await?;
        let purchases = with_spinner(
            "Fetching purchases...",
            !options.json,
            ledger.purchases(page_size, max_pages),
        )
        .await
        .operation("fetching purchases")?;

        print_list(options, &purchases, "purchases", "No purchases found.")?;

        let limit = clamp_page_size(page_size) as usize * max_pages as usize;
        if !options.json && max_pages > 0 && purchases.len() >= limit {
            println!("Showing the first {} pages. Use --max-pages 0 to fetch all.", max_pages);
        }
        Ok(())
    }

    async fn create(&self, args: CreatePurchaseArgs) -> Result<(), AppError> {
        let request = purchase_request(args)?;
        let ledger = self.ctx.ledger().await?;
        let location = with_spinner(
            "Creating purchase...",
            !self.ctx.options().json,
            ledger.create_purchase(&request),
        )
        .await
        .operation("creating purchase")?;

        if self.ctx.options().json {
            return print_json(&json!({ "location": location }));
        }
        print_success("Purchase created");
        if let Some(location) = location {
            println!("Location: {}", location);
        }
        Ok(())
    }
}

/// VAT percentage for the Norwegian VAT types with a fixed rate.
fn vat_rate_percent(vat_type: &str) -> i64 {
    match vat_type {
        "HIGH" => 25,
        "MEDIUM" => 15,
        "LOW" => 12,
        _ => 0,
    }
}

/// VAT in cents for a net amount in cents, rounded half away from zero.
/// `None` when the amount is too large to carry VAT.
fn vat_amount(net_cents: i64, vat_type: &str) -> Option<i64> {
    let scaled = net_cents.checked_mul(vat_rate_percent(vat_type))?;
    let rounded = if scaled >= 0 {
        scaled.checked_add(50)?
    } else {
        scaled.checked_sub(50)?
    };
    Some(rounded / 100)
}

fn purchase_request(args: CreatePurchaseArgs) -> Result<PurchaseRequest, AppError> {
    let account = args.account.trim();
    if account.is_empty() {
        return Err(CliError::InvalidArguments("--account cannot be empty".to_string()).into());
    }
    let date = parse_date(&args.date)?;
    let due_date = args.due_date.as_deref().map(parse_date).transpose()?;
    let net_amount = parse_amount(&args.amount)?;
    let vat_type = args.vat_type.trim().to_uppercase();
    let vat = vat_amount(net_amount, &vat_type).ok_or_else(|| {
        CliError::InvalidArguments(format!("Amount too large: {}", args.amount.trim()))
    })?;

    Ok(PurchaseRequest {
        date,
        due_date,
        kind: args.kind.trim().to_string(),
        lines: vec![OrderLine {
            description: args.description.filter(|d| !d.trim().is_empty()),
            account: Some(account.to_string()),
            net_amount,
            vat_amount: vat,
            vat_type,
            ..Default::default()
        }],
        supplier: None,
        currency: args.currency.trim().to_uppercase(),
        payment_account: args.payment_account.filter(|a| !a.trim().is_empty()),
        identifier: args.identifier.filter(|i| !i.trim().is_empty()),
    })
}

pub struct StatusHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> StatusHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self) -> Result<(), AppError> {
        let ledger = self.ctx.ledger().await?;
        let report = with_spinner(
            "Loading dashboard...",
            !self.ctx.options().json,
            StatusService::new(&ledger).report(),
        )
        .await;

        if self.ctx.options().json {
            return print_json(&report.summary());
        }

        println!("📊 Dashboard for: {}", report.company);
        println!("{}", "─".repeat(50));
        println!();
        println!("📥 Inbox: {}", count_line(&report.inbox, "documents"));
        println!("🛒 Purchases: {}", count_line(&report.purchases, "total"));
        match &report.bank_accounts {
            Ok(accounts) => {
                println!("🏦 Bank accounts: {} accounts", accounts.len());
                for account in accounts.iter().filter(|a| !a.inactive) {
                    println!("   {}", bank_account_line(account));
                }
            }
            Err(e) => println!("🏦 Bank accounts: error ({})", e),
        }
        println!("👥 Contacts: {}", count_line(&report.contacts, "total"));
        println!();
        Ok(())
    }
}

fn count_line<E: Display>(result: &Result<u32, E>, unit: &str) -> String {
    match result {
        Ok(count) => format!("{} {}", count, unit),
        Err(e) => format!("error ({})", e),
    }
}

fn bank_account_line(account: &BankAccount) -> String {
    format!(
        "{} ({}) - {}",
        account.name,
        account.account_code,
        or_empty(&account.bank_account_number)
    )
}

/// The configuration in effect, with defaults filled in
#[derive(Debug, Serialize)]
struct EffectiveConfig {
    config_file: String,
    api_url: String,
    rate_limit_ms: u64,
    keyring_backend: String,
    page_size: u32,
}

pub struct ConfigHandler<'a> {
    ctx: &'a Dispatcher,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(ctx: &'a Dispatcher) -> Self {
        Self { ctx }
    }

    pub fn handle(&self, command: ConfigCommands) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => self.show(),
            ConfigCommands::Set { key, value } => {
                self.ctx.print_verbose(&format!("Setting config key {}", key));

                let mut config = self.ctx.config().clone();
                config.set_value(&key, &value)?;
                config.save(Some(Config::config_file_path(Some(self.ctx.config_dir()))?))?;

                print_success(&format!("Set {} = {}", key, value.trim()));
                Ok(())
            }
        }
    }

    fn show(&self) -> Result<(), AppError> {
        let config = self.ctx.config();
        let effective = EffectiveConfig {
            config_file: Config::config_file_path(Some(self.ctx.config_dir()))?
                .display()
                .to_string(),
            api_url: config.effective_api_url(self.ctx.options().api_url.as_deref()),
            rate_limit_ms: config.effective_min_delay().as_millis() as u64,
            keyring_backend: self.ctx.backend().to_string(),
            page_size: config.effective_page_size(),
        };

        if self.ctx.options().json {
            return print_json(&effective);
        }

        println!("Current Configuration:");
        println!("=====================");
        println!("Config file: {}", effective.config_file);
        println!("API URL: {}", effective.api_url);
        println!("Rate limit: {} ms", effective.rate_limit_ms);
        println!("Keyring backend: {}", effective.keyring_backend);
        println!("Page size: {}", effective.page_size);
        Ok(())
    }
}
