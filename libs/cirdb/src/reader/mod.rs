//! Readers that populate a database from files.
//!
//! Readers only interact with the database through
//! [`CirBuilder`](crate::builder::CirBuilder).

pub mod guide;
