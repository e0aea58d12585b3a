//! Quotagate - In-Process Admission Control
//!
//! This crate implements a multi-scope admission-control component that gates
//! expensive operations (image-generation requests) before they run and
//! reconciles their true cost afterward. Quotas are tracked simultaneously
//! per logical session, per client identity, and globally, each over rolling
//! hour/day/month windows. All state is in-memory and dies with the process.

pub mod admission;
pub mod config;
pub mod error;
