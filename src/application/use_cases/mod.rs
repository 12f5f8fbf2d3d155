//! Use case implementations.

mod resolve_image_use_case;

pub use resolve_image_use_case::ResolveImageUseCase;
