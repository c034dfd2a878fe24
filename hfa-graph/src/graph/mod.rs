//! Typed knowledge graph: construction, inference, desert detection, export

pub mod build;
pub mod desert;
pub mod export;
pub mod inference;
pub mod requirements;
pub mod schema;

pub use build::build_graph;
pub use schema::KnowledgeGraph;
