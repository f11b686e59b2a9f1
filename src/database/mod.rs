pub mod address;
pub mod backend;
pub mod connection;
pub mod profile;
pub mod quiz;
