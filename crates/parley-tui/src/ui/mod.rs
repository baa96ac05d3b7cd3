//! Terminal user interface components.
//!
//! - `input`: keyboard handling for the login and home screens
//! - `render`: drawing both screens
//! - `styles`: shared colours and text styles

pub mod input;
pub mod render;
pub mod styles;
