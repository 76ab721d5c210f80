pub mod company_service;
pub mod ledger_service;
pub mod status_service;
pub mod types;
