//! Request handlers for the tailor-shop API.
//!
//! Handlers stay thin: deserialize the request, call the engine, map the
//! result to the response shape. Error-to-status mapping comes from the
//! `ApiError` conversion on the engine's error type.

pub mod clients;
pub mod orders;
pub mod password;
pub mod records;
