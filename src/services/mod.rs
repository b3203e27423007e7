//! Business logic services.
//!
//! Scoring primitives, the proposal engine built on them, and the cache and
//! ranking layers around it.

mod keyword_resolver;
mod proposal_cache;
mod proposal_engine;
mod proposal_service;
mod ranker;
pub mod similarity;
pub mod terms;

pub use keyword_resolver::KeywordResolver;
pub use proposal_cache::ProposalCache;
pub use proposal_engine::{MEMORY_TOPIC_ID, ProposalEngine};
pub use proposal_service::ProposalService;
pub use ranker::ProposalRanker;
