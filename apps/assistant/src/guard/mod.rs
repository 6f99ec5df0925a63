// Abuse guards for the chat pipeline: input sanitization and per-user
// sliding-window rate limiting. Both run before any intent matching.

pub mod rate_limit;
pub mod sanitizer;
