//! Client core for an RFP procurement platform
//!
//! Everything a frontend needs short of rendering: field and form
//! validation, form controllers with submission lifecycle, page data
//! loading, the REST API client, session persistence, and toasts.

pub mod api;
pub mod config;
pub mod logging;
pub mod session;
pub mod state;
pub mod toast;
pub mod validation;

pub use config::ClientConfig;
pub use session::{Session, SessionStore};
pub use toast::ToastQueue;
