//! Client-side state: domain models, form controllers, and page data

pub mod forms;
pub mod models;
pub mod pages;
