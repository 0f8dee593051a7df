//! Integration tests driving the desk-updates binary

mod helpers;

mod test_build;
mod test_compose;
mod test_send;
mod test_status;
