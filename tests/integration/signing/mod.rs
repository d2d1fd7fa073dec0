//! Signing service and workflow integration tests

mod client_test;
