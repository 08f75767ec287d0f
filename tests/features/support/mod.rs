//! Shared scenario state

pub mod world;

pub use world::TestWorld;
