pub mod cleanup;
pub mod health;
pub mod profile;
pub mod tags;
pub mod upload;
pub mod works;
