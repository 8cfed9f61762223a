pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod test_papers;
