//! One-shot flash messages layered on top of a session.
//!
//! Flash entries live under a reserved session key until a [`FlashBag`]
//! binds to the session and pulls them into its buffer; from that moment the
//! record no longer holds them, which is what makes delivery at-most-once.
//! Entries added during a request go straight back into the record — set
//! now, read next request.

mod bag;
mod entry;

#[cfg(test)]
mod tests;

pub use bag::{DEFAULT_FLASH_KEY, FlashBag};
pub use entry::FlashEntry;
