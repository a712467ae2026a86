// External stage clients used by the pipeline orchestrator.
// Each stage is a narrow async trait backed by an AWS service client;
// wire responses are narrowed into crate types at this layer.

pub mod bedrock;
pub mod entities;
pub mod extraction;
pub mod feedback;
pub mod prompts;
pub mod store;
