//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, bearer-token security, the shared
//! server state and the JSON/problem conventions every handler answers with.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use sc_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use sc_kernel::config::{ConfigSources, load_config};
//! use sc_kernel::domain::config::ApiConfig;
//!
//! let sources = ConfigSources::new().environment("Development").set("server.port", "5000");
//! let cfg: ApiConfig = load_config(&sources).unwrap();
//! ```
pub mod config;
pub mod security;
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use nanoid::nanoid;
pub use sc_database as database;
pub use sc_domain as domain;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
