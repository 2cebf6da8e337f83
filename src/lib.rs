#![forbid(unsafe_code)]

pub mod error;
pub mod gallery;

pub use error::{ApiError, SetupError, StoreError};

// Re-export the session surface at crate root for convenience
pub use crate::gallery::net::{CredentialProvider, GalleryApi, HttpGalleryApi, NoAuth};
pub use crate::gallery::state::{
    LikeToggle, Lightbox, LightboxAdvance, PhotoCollection, PhotoId, PhotoRecord, PhotoView,
    WrapCause,
};
pub use crate::gallery::{GalleryConfig, GallerySession, GalleryStatus};
