// Analysis pipeline: fetch → extract → {recognize, generate} → assemble.
// All external calls go through the stage clients in `services`.

pub mod error;
pub mod orchestrator;

#[cfg(test)]
pub mod fakes;
