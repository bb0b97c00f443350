//! # CLI Module
//!
//! User-facing commands of the `echostats` binary:
//!
//! - [`serve`] - runs the HTTP service (`/auth/callback`, `/auth/refresh`,
//!   `/stats/summary`, `/health`)
//! - [`summary`] - fetches and aggregates one listening summary and prints
//!   it as tables or JSON
//! - [`token`] - exchanges an authorization code or refreshes a token by
//!   hand
//!
//! Commands report through the console macros (`info!`, `warning!`,
//! `error!`). Fatal problems end the process with status 1.

mod serve;
mod summary;
pub mod token;

pub use serve::serve;
pub use summary::summary;
