#![forbid(unsafe_code)]

mod canonicalization;
mod errors;
mod resource_key;
mod types;

pub use crate::{
    canonicalization::canonicalize_for_resource,
    errors::{CoreError, CoreResult},
    resource_key::ResourceKey,
    types::{CropMode, Gravity, ImageRole, ImageSource, OutputFormat, Quality, TransformSpec},
};
