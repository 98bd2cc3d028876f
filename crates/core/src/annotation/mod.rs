//! Client-side video annotation model.
//!
//! Objects are tracked entities bound to one class; figures place an
//! object's geometry on one frame; frames group figures by index; the
//! [`VideoAnnotation`] aggregates everything for a single video and
//! enforces the cross-entity invariants on construction.

mod figure;
mod frame;
mod object;
mod video;

pub use figure::VideoFigure;
pub use frame::Frame;
pub use object::VideoObject;
pub use video::VideoAnnotation;
