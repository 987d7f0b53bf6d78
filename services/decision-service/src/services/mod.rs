pub mod decision_store;
pub mod deep_reasoner;
pub mod extractor;
pub mod fixtures;
pub mod governance;
pub mod graph_store;
pub mod llm_client;
pub mod normalizer;
pub mod pack;
pub mod pipeline;
pub mod reasoning;
pub mod subgraph;
pub mod tenant_registry;
