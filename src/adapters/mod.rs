pub mod api_errors;
pub mod bold;
pub mod ws;
