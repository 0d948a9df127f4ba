pub mod console;

pub use console::{format_token, ConsoleReporter};
