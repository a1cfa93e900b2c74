#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the secman crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! secman-derive.workspace = true
//! ```
//!
//! Examples are `ignore`d to avoid compiling in this crate; see `tests/ui` for
//! expansions that are checked by `trybuild`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// Turns a plain enum into a `thiserror` error with optional context strings and
/// ergonomic conversions, so every crate in the workspace reports failures the same way.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait with `.context(...)` for
///   `Result<T, Name>` and for `Result<T, Source>` of every convertible source type.
/// * **Conversions**: Implements `From<Source>` for variants whose wrapped error lives in a
///   field named `source` (or marked `#[from]`), enabling `?` on upstream errors.
/// * **Causes without conversion**: A field marked `#[source]` under any other name (e.g.
///   `cause`) is reported as the error source but gets no `From` impl. Use it when several
///   variants wrap the same error type.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant with a `message` field exists.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. Variants wrapping another error must carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use secman_derive::secman_error;
/// use std::borrow::Cow;
///
/// #[secman_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal storage error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<Vec<u8>, StorageError> {
///     std::fs::read(path).context("Reading blob")
/// }
/// ```
#[proc_macro_attribute]
pub fn secman_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
