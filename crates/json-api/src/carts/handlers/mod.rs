//! Cart Handlers

pub(crate) mod delete;
pub(crate) mod get;
