use crate::api::client::FikenClient;
use crate::cli::command_handlers::{
    AuthHandler, CompaniesHandler, ConfigHandler, LedgerHandler, PurchasesHandler, StatusHandler,
};
use crate::cli::main_types::{Cli, Commands, ContactsCommands};
use crate::core::services::company_service::CompanyService;
use crate::core::services::ledger_service::LedgerService;
use crate::core::services::types::{AccountRange, ContactFilter};
use crate::error::AppError;
use crate::storage::config::Config;
use crate::storage::credentials::{Credentials, KeyringBackend};
use crate::utils::logging::print_verbose;
use std::path::{Path, PathBuf};

/// Flags that apply to every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub json: bool,
    pub no_input: bool,
    pub company: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose,
            json: cli.json,
            no_input: cli.no_input,
            company: cli.company.clone(),
            token: cli.token.clone(),
            api_url: cli.api_url.clone(),
        }
    }

    /// `--token` / `FIKEN_API_TOKEN`, ignoring blanks.
    pub fn token_override(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

pub struct Dispatcher {
    options: GlobalOptions,
    config: Config,
    config_dir: PathBuf,
    backend: KeyringBackend,
    credentials: Credentials,
}

impl Dispatcher {
    pub fn new(
        options: GlobalOptions,
        config: Config,
        config_dir: PathBuf,
        backend: KeyringBackend,
        credentials: Credentials,
    ) -> Self {
        Self {
            options,
            config,
            config_dir,
            backend,
            credentials,
        }
    }

    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn backend(&self) -> KeyringBackend {
        self.backend
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn print_verbose(&self, msg: &str) {
        print_verbose(self.options.verbose, msg);
    }

    /// Token from `--token` first, then the secret store.
    pub fn token(&self) -> Result<String, AppError> {
        match self.options.token_override() {
            Some(token) => Ok(token.to_string()),
            None => self.credentials.load_token(),
        }
    }

    /// Client configured from the token, API URL and rate limit in effect.
    pub fn client(&self) -> Result<FikenClient, AppError> {
        let token = self.token()?;
        let base_url = self
            .config
            .effective_api_url(self.options.api_url.as_deref());
        self.print_verbose(&format!("Using API at {}", base_url));

        Ok(FikenClient::new(token)?
            .with_base_url(&base_url)
            .with_min_delay(self.config.effective_min_delay()))
    }

    /// Ledger access for the company selected by flag, stored default or
    /// auto-detection.
    pub async fn ledger(&self) -> Result<LedgerService, AppError> {
        let client = self.client()?;
        let stored_default = self.credentials.default_company()?;
        let slug = CompanyService::new(client.clone())
            .resolve_company(self.options.company.as_deref(), stored_default)
            .await?;
        self.print_verbose(&format!("Using company {}", slug));

        Ok(LedgerService::new(
            client,
            slug,
            self.config.effective_page_size(),
        ))
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Auth { command } => AuthHandler::new(self).handle(command).await,
            Commands::Companies { command } => CompaniesHandler::new(self).handle(command).await,
            Commands::Accounts { from, to } => {
                LedgerHandler::new(self)
                    .accounts(AccountRange { from, to })
                    .await
            }
            Commands::Balances { date } => LedgerHandler::new(self).balances(date).await,
            Commands::Bank { .. } => LedgerHandler::new(self).bank_accounts().await,
            Commands::Inbox { status } => LedgerHandler::new(self).inbox(status).await,
            Commands::Purchases { command } => PurchasesHandler::new(self).handle(command).await,
            Commands::Sales { .. } => LedgerHandler::new(self).sales().await,
            Commands::Invoices { .. } => LedgerHandler::new(self).invoices().await,
            Commands::Contacts {
                command: ContactsCommands::List { customer, supplier },
            } => {
                let filter = if customer {
                    ContactFilter::Customers
                } else if supplier {
                    ContactFilter::Suppliers
                } else {
                    ContactFilter::All
                };
                LedgerHandler::new(self).contacts(filter).await
            }
            Commands::Journal { .. } => LedgerHandler::new(self).journal_entries().await,
            Commands::Transactions { .. } => LedgerHandler::new(self).transactions().await,
            Commands::Status => StatusHandler::new(self).handle().await,
            Commands::Config { command } => ConfigHandler::new(self).handle(command),
        }
    }
}
