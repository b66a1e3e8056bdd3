pub mod admin;
pub mod auth;
pub mod flash;
pub mod home;
pub mod profile;
pub mod router;
pub mod state;
pub mod templates;
pub mod views;

pub use state::AppState;
pub use templates::escape_html;
