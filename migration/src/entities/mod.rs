pub mod client_error;
pub mod gist;
pub mod macro_entry;
pub mod macro_report;
pub mod macro_usage;

pub use client_error::Entity as ClientErrorEntity;
pub use gist::Entity as GistEntity;
pub use macro_entry::Entity as MacroEntity;
pub use macro_report::Entity as MacroReportEntity;
pub use macro_usage::Entity as MacroUsageEntity;
