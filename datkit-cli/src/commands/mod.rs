pub(crate) mod config;
pub(crate) mod dir2dat;
pub(crate) mod merge;
