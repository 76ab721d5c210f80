use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fiken")]
#[command(about = "Command-line client for the Fiken.no accounting API")]
#[command(
    long_about = "fiken is a command-line client for the Fiken.no accounting API.\n\n\
Manage your Norwegian business accounting from the terminal:\n\
companies, purchases, invoices, bank accounts, and more."
)]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Never prompt for input
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Company slug (auto-detected if only one)
    #[arg(long, global = true)]
    pub company: Option<String>,

    /// Secret storage: auto, secret-service, keychain, wincred, file
    #[arg(long, global = true, env = "FIKEN_KEYRING_BACKEND")]
    pub keyring_backend: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// API token to use instead of the stored one
    #[arg(long, global = true, env = "FIKEN_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, env = "FIKEN_API_URL", hide = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List companies or set the default company
    Companies {
        #[command(subcommand)]
        command: Option<CompaniesCommands>,
    },
    /// List the chart of accounts
    Accounts {
        /// Filter from account code
        #[arg(long)]
        from: Option<String>,
        /// Filter to account code
        #[arg(long)]
        to: Option<String>,
    },
    /// List account balances
    Balances {
        /// Balance date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Bank accounts
    Bank {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// List documents in the EHF inbox
    Inbox {
        /// Filter by status (pending, processed)
        #[arg(long)]
        status: Option<String>,
    },
    /// List and create purchases
    Purchases {
        #[command(subcommand)]
        command: PurchasesCommands,
    },
    /// Sales
    Sales {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Invoices
    Invoices {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Customers and suppliers
    Contacts {
        #[command(subcommand)]
        command: ContactsCommands,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Transactions
    Transactions {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Dashboard overview
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Set or show the API token
    #[command(
        long_about = "Set your Fiken personal API token.\n\n\
Get your token from: https://fiken.no/innstillinger/api\n\
Without arguments, shows whether a token is configured.\n\n\
To keep the token out of process listings, pipe it via stdin:\n  \
echo \"mytoken\" | fiken auth token --stdin"
    )]
    Token {
        token: Option<String>,
        /// Read the token from stdin instead of the command line
        #[arg(long, conflicts_with = "token")]
        stdin: bool,
    },
    /// Prompt for the API token without echoing it
    Login,
    /// Remove the stored token
    Logout,
    /// Check that the token works
    Status,
}

#[derive(Subcommand, Debug)]
pub enum CompaniesCommands {
    /// List companies
    List,
    /// Set or show the default company
    Default { slug: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List all entries
    List,
}

#[derive(Subcommand, Debug)]
pub enum PurchasesCommands {
    /// List purchases
    List {
        /// Items per page (1-100)
        #[arg(long)]
        page_size: Option<i64>,
        /// Stop after this many pages, 0 fetches all
        #[arg(long, default_value = "4")]
        max_pages: u32,
    },
    /// Create a purchase
    Create(CreatePurchaseArgs),
}

#[derive(Args, Debug)]
pub struct CreatePurchaseArgs {
    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
    /// Expense account code, e.g. 6800
    #[arg(long)]
    pub account: String,
    /// Net amount in kroner, e.g. 1250,00
    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,
    /// VAT type, e.g. HIGH, MEDIUM, LOW, NONE
    #[arg(long)]
    pub vat_type: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value = "cash_purchase")]
    pub kind: String,
    #[arg(long, default_value = "NOK")]
    pub currency: String,
    /// Account the purchase was paid from, e.g. 1920:10001
    #[arg(long)]
    pub payment_account: Option<String>,
    /// Invoice or receipt number
    #[arg(long)]
    pub identifier: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ContactsCommands {
    /// List contacts
    List {
        /// Only customers
        #[arg(long, conflicts_with = "supplier")]
        customer: bool,
        /// Only suppliers
        #[arg(long)]
        supplier: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Set configuration value
    Set {
        /// api-url, rate-limit-ms, keyring-backend or page-size
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_purchase_create() {
        let cli = Cli::try_parse_from([
            "fiken",
            "--company",
            "acme",
            "purchases",
            "create",
            "--date",
            "2024-05-01",
            "--account",
            "6800",
            "--amount",
            "1250,00",
            "--vat-type",
            "HIGH",
        ])
        .unwrap();

        assert_eq!(cli.company.as_deref(), Some("acme"));
        match cli.command {
            Commands::Purchases {
                command: PurchasesCommands::Create(args),
            } => {
                assert_eq!(args.kind, "cash_purchase");
                assert_eq!(args.currency, "NOK");
                assert_eq!(args.amount, "1250,00");
            }
            _ => panic!("expected purchases create"),
        }
    }

    #[test]
    fn test_companies_subcommand_is_optional() {
        let cli = Cli::try_parse_from(["fiken", "companies", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Companies { command: None }));
    }

    #[test]
    fn test_contacts_filters_conflict() {
        assert!(
            Cli::try_parse_from(["fiken", "contacts", "list", "--customer", "--supplier"]).is_err()
        );
    }

    #[test]
    fn test_purchases_list_defaults_to_four_pages() {
        let cli = Cli::try_parse_from(["fiken", "purchases", "list"]).unwrap();
        match cli.command {
            Commands::Purchases {
                command: PurchasesCommands::List { max_pages, page_size },
            } => {
                assert_eq!(max_pages, 4);
                assert_eq!(page_size, None);
            }
            _ => panic!("expected purchases list"),
        }
    }
}
