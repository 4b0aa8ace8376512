//! Backend API surface: client, trait seam, payloads, and error taxonomy

mod client;
mod error;
mod payload;
mod traits;

pub use client::*;
pub use error::*;
pub use payload::*;
pub use traits::*;
