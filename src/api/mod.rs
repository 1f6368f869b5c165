//! Backend API Layer - typed access to the dashboard backend
//!
//! This module provides:
//! - Wire types for every backend operation the dashboard consumes
//! - `DashboardApi` trait for backend abstraction
//! - `HttpDashboardApi`, which runs every call through the throttled transport

pub mod client;
pub mod http;
pub mod types;

pub use client::DashboardApi;
pub use http::HttpDashboardApi;
pub use types::{
    Appointment, Category, CoupleInfo, CoupleResultPayload, Invitation, PartnerStatusPayload, PartnerSummary,
    ProfileDetails, Resource, ResultBody, SideStatus, UserProfile,
};
