pub mod image_store;
pub mod ooxml;

pub use image_store::ImageStore;
pub use ooxml::PendingArtifact;
