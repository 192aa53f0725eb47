//! PDF Bundle Composer: the generated letter followed by the user's
//! supporting documents, as one downloadable PDF.

pub mod attachment;
pub mod composer;
pub mod font_metrics;
pub mod handlers;
pub mod image;
pub mod text_layout;

pub use attachment::{AttachmentFile, SkippedAttachment};
pub use composer::{compose_bundle, CompositionError};
