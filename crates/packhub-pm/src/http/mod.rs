//! HTTP fetching for remote pack archives and marketplace manifests.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpError};
