//! Routing module - dispatch, aggregation, rendering and chunking

pub mod chunker;
pub mod render;
pub mod router;

pub use chunker::{split, Fragment};
pub use render::{AggregatedResponse, LabeledResult, RenderPolicy, DELIVERY_FAILURE_MESSAGE};
pub use router::{default_mode, MessageRouter, Reply, StatusReport};
