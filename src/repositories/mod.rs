pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod test_papers;
pub(crate) mod users;
