pub mod output;
pub mod progress;
pub mod rows;
pub mod table;

pub use output::{count_footer, print_error, print_info, print_json, print_success};
pub use progress::ProgressSpinner;
pub use table::{TableDisplay, Tabular};
