// Tests module
// Scenarios: full call sequences against the store, then through the service
// Invariants: property tests over arbitrary call sequences

pub mod invariants;
