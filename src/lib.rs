//! Engine layer for a single-page storefront client.
//!
//! Owns everything below the view layer: the cart reconciliation engine,
//! the admin media ordering/diff engine, typed entity edit forms, the REST
//! client they all talk through, and the durable client-side store holding
//! the cart session identity. A host shell renders state and forwards user
//! gestures; no rendering, routing, or chat-transport concerns live here.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
