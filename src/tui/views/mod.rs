//! One view per route

mod catalog;
mod chat;
mod login;
mod profile;
mod settings;

pub use catalog::CatalogView;
pub use chat::ChatView;
pub use login::LoginView;
pub use profile::ProfileView;
pub use settings::SettingsView;
