//! Flutter bridge crate for the LazyCal scheduling core.

pub mod api;
