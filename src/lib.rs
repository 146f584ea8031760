//! A minimal SOCKS5 proxy library
//!
//! ## SOCKS5 Implementation
//!
//! - Features:
//!     - CONNECT to IPv4 destinations
//!     - No Authentication
//!     - IPv6 and domain name requests are parsed and refused with
//!       "address type not supported"
//!     - BIND and UDP ASSOCIATE are refused with "command not supported"
//!     - Async using tokio, one task per client
//! - [SOCKS5 (RFC 1928)](https://datatracker.ietf.org/doc/html/rfc1928)
//!
//! # Example
//! ```no_run
//! use minisocks::Socks5Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = Socks5Server::new("127.0.0.1:7890");
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod auth;
pub mod codec;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod server;

// Re-export main types at crate root for convenience
pub use address::Address;
pub use error::{Result, Socks5Error};
pub use protocol::{AddressType, AuthMethod, Command, ReplyCode, Version};
pub use server::Socks5Server;
