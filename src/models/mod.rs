//! Wire-level data models for the storefront REST API.
//!
//! These entities mirror the JSON shapes served by the backend (camelCase
//! field names on the wire) plus the in-memory media types the admin
//! editor works with. They carry no behavior beyond small accessors.

pub mod cart;
pub mod category;
pub mod media;
pub mod news;
pub mod product;
