mod error_handler;
mod origin;

pub use error_handler::log_errors;
pub use origin::check_origin;
