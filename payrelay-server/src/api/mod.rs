//! HTTP surface.
//!
//! # Endpoints
//!
//! - `POST /payments`         – accept a payment and queue it for dispatch
//! - `GET  /payments-summary` – totals per processor over a time window
//! - `POST /purge`            – administrative wipe of queue and index
//! - `GET  /health`           – liveness

pub mod create_payment;
pub mod payments_summary;
pub mod purge;
