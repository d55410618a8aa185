//! # mailsweep-gmail
//!
//! Strongly-typed REST bindings for the remote mail source.
//!
//! This crate provides:
//! - Wire types for list/fetch/label/modify responses, with explicit
//!   per-field optionality
//! - The [`MailSource`] trait, the narrow seam the sync engine consumes
//! - [`GmailClient`], a `reqwest`-backed implementation
//! - The [`TokenProvider`] seam for plugging in an external auth layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod encoding;
mod error;
mod model;
mod source;
mod token;

pub use client::GmailClient;
pub use error::{Error, Result};
pub use model::{
    BatchModifyRequest, Header, Label, LabelKind, LabelListResponse, Message, MessageFormat,
    MessageListPage, MessageRef, MessagePart, PartBody,
};
pub use source::MailSource;
pub use token::{StaticToken, TokenProvider};
