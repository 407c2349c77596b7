//! Typed models of the Open Library JSON responses.
//!
//! Only the fields this crate reads are modelled, unknown fields are ignored.

pub mod author;
pub mod edition;
pub mod search;
pub mod work;
