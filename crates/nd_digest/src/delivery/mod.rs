pub mod console;
pub mod smtp;

pub use console::ConsoleSender;
pub use smtp::{SmtpConfig, SmtpSender};
