//! Message protocol between a UI and the analyzer
//!
//! Requests and responses are JSON objects tagged by `type`. The
//! [`RequestHandler`] decodes them, runs the matching workflow against its
//! document host and stores, and replies with one or more responses.

pub mod handler;
pub mod messages;

pub use handler::RequestHandler;
pub use messages::{BindPayload, ColorPayload, CreatePayload, Request, Response, VariableOptions};
