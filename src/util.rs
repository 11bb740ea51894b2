pub(crate) mod retry;
pub(crate) mod sanitize;

pub mod text;
