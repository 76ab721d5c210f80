use crate::error::{AppError, DisplayError};
use serde::Serialize;
use std::io::{self, Write};

/// Pretty-printed JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<(), AppError> {
    let json = to_pretty_json(data)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json).map_err(|e| DisplayError::TerminalOutput(e.to_string()))?;
    Ok(())
}

pub fn to_pretty_json<T: Serialize + ?Sized>(data: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(data).map_err(|e| DisplayError::Json(e.to_string()).into())
}

pub fn print_success(msg: &str) {
    println!("✅ {}", msg);
}

pub fn print_info(msg: &str) {
    println!("ℹ️ {}", msg);
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {}", msg);
}

/// `\n<count> <noun>` footer under list tables
pub fn count_footer(count: usize, noun: &str) -> String {
    format!("\n{} {}", count, noun)
}
