use crate::error::{AppError, AuthError, CliError};
use rpassword::read_password;
use std::io::{self, BufRead, Write};

/// Where `auth token` / `auth login` read the API token from
pub struct TokenInput {
    pub token: String,
}

impl TokenInput {
    /// Take the token from a command argument.
    pub fn from_arg(arg: &str) -> Self {
        Self {
            token: arg.trim().to_string(),
        }
    }

    /// Read the first line of `reader`, e.g. `echo $TOKEN | fiken auth token --stdin`.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, AppError> {
        let mut line = String::new();
        reader.read_line(&mut line).map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Failed to read token from stdin: {}",
                e
            )))
        })?;
        Ok(Self {
            token: line.trim().to_string(),
        })
    }

    /// Prompt on the terminal without echoing the token.
    pub fn prompt() -> Result<Self, AppError> {
        println!("Create a personal API token at https://fiken.no/innstillinger/api");
        print!("API token: ");
        io::stdout().flush().map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Failed to flush stdout: {}",
                e
            )))
        })?;

        let token = read_password().map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Failed to read token: {}",
                e
            )))
        })?;

        Ok(Self {
            token: token.trim().to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.token.is_empty() {
            return Err(AuthError::EmptyToken.into());
        }
        Ok(())
    }
}
