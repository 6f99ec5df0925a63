// Chat turn pipeline and its HTTP handlers.

pub mod handlers;
pub mod pipeline;
