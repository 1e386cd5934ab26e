//! Transfer objects shared by both services.
//!
//! Created on deserialisation of a request or response and dropped once the
//! response has been written. Field names follow the camelCase JSON the
//! services exchange.

pub mod address;
pub mod flaky;

pub use address::AddressResponse;
pub use flaky::FlakyDto;
