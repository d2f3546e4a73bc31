pub(crate) mod answers;
pub(crate) mod attempts;
pub(crate) mod responses;
pub(crate) mod scoring;
