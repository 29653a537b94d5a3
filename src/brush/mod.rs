//! Editing tools.
//!
//! [`settings`] holds the current tool and brush values, [`stamp`] applies one
//! brush dab, and [`session`] turns pointer events into strokes and drags that
//! end in a single commit.

pub mod session;
pub mod settings;
pub mod stamp;
