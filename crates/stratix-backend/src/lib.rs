//! # stratix-backend
//!
//! Clients for the services behind the gateway: the backend REST API that
//! owns objectives, initiatives and areas, and the edge function that
//! answers conversational assistant actions.

pub mod assistant;
pub mod client;
pub mod error;
pub mod models;

pub use assistant::{AssistantReply, AssistantService};
pub use client::{BackendClient, CallerContext};
pub use error::DataFetchError;
