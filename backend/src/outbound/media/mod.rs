//! Hosted image storage adapters.

mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore};
