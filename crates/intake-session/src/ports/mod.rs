//! Ports module (Hexagonal Architecture)
//!
//! Defines the collaborators a session depends on and the surface it offers
//! to its host.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
