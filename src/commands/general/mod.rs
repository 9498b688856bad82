pub(crate) mod info;
pub(crate) mod ping;
