//! Server-side HTML composition.
//!
//! Everything renderable implements [`Render`], which receives the request's
//! [`AuthContext`](crate::identity::AuthContext) explicitly. [`Gate`] wraps
//! any renderable behind a permission requirement.

mod markup;
mod gate;
pub mod site;
pub mod control;

pub use markup::{escape, Fragment, Markup, Render};
pub use gate::Gate;
