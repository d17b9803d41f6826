//! Core primitives shared by the ledger and the settlement engine

pub mod money;
