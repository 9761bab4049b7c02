pub(crate) mod common;
pub(crate) mod criteria;
pub(crate) mod document;
pub(crate) mod step;
pub(crate) mod workflow;
