pub(crate) mod config;
pub(crate) mod history;
pub(crate) mod parse;
pub(crate) mod render;
