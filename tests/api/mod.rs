//! REST client tests.

mod client_test;
