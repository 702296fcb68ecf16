//! State module for the values that flow through a crawl
//!
//! # Components
//!
//! - `Capability`: how deeply a URL must be handled (`Check < Full`)
//! - `DocumentKind`: HTML, CSS or anything else, chosen once per fetch
//! - `CrawlTarget`: a URL submitted to the frontier
//! - `FetchOutcome`: the terminal record of one fetch attempt

mod capability;
mod outcome;

// Re-export main types
pub use capability::{Capability, CrawlTarget, DocumentKind};
pub use outcome::{FetchFailure, FetchOutcome};
