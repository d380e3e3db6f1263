pub mod beacon_state;
pub mod cache;
pub mod collections;
pub mod config;
pub mod consts;
pub mod containers;
pub mod nonstandard;
pub mod preset;
pub mod primitives;
