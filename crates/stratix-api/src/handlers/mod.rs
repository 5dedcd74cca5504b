//! Route handlers organized by domain.

pub mod assistant;
pub mod data;
pub mod health;
pub mod me;
pub mod pages;
pub mod tenant;
