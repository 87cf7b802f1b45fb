pub mod google_news;
pub mod sheets;

pub use google_news::GoogleNewsSource;
pub use sheets::SheetSource;
