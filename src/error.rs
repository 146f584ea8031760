//! Error types for the SOCKS5 core
//!
//! Every variant is local to one client connection and terminal for it.

use std::io;
use thiserror::Error;

/// Result alias used by the protocol layer
pub type Result<T> = std::result::Result<T, Socks5Error>;

/// SOCKS5 protocol and transport errors
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// VER field was not 0x05
    #[error("protocol version not supported: {0:#04x}")]
    VersionNotSupported(u8),

    /// CMD field outside CONNECT/BIND/UDP ASSOCIATE, or a command we refuse
    #[error("request command not supported: {0:#04x}")]
    CommandNotSupported(u8),

    /// RSV field was not 0x00
    #[error("request reserved field must be zero, got {0:#04x}")]
    InvalidReservedField(u8),

    /// ATYP field unknown, or an address type we refuse to dial
    #[error("request address type not supported: {0:#04x}")]
    TypeNotSupported(u8),

    /// REP field outside the values assigned by RFC 1928
    #[error("reply code not assigned: {0:#04x}")]
    UnassignedReplyCode(u8),

    /// Domain name longer than the single length octet can describe
    #[error("domain name too long: {0} bytes (max 255)")]
    DomainTooLong(usize),

    /// Client did not offer "no authentication required"
    #[error("no acceptable authentication method offered")]
    NoAcceptableMethod,

    /// Dialing the requested destination failed
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Short read, write failure or other socket error
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
