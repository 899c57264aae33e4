//! Decoder for SwampSat II beacon frames and downlinked image data.

pub mod cursor;
pub use cursor::{ByteCursor, Underflow};

pub mod dispatch;
pub use dispatch::{DecodeError, Decoder};

pub mod float;
pub use float::FloatFormatError;

pub mod image;
pub use image::{Image, ImageError};

pub mod layout;
pub use layout::{FrameLayout, Generation};

pub mod normalize;
pub use normalize::{Frame, InputError};

pub mod record;
pub use record::{Record, Value};

pub mod schema;
