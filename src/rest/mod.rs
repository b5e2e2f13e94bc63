pub mod client;
pub mod types;

pub use client::{AminoRestClient, AminoRestClientBuilder, ApiResponse, CallOptions};
