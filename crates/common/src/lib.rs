// marginalia-common: shared types and pure algorithms for the review session

pub mod error;
pub mod fingerprint;
pub mod protocol;
pub mod render;
pub mod types;
