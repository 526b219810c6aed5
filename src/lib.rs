pub mod app;
pub mod books;
pub mod config;
pub mod error;
pub mod identity;
pub mod loans;
pub mod state;
pub mod users;
