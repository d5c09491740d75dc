pub mod client;

pub use client::ContractClient;
