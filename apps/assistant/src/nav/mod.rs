// Free-text navigation: heuristic intent matching and response composition.

pub mod composer;
pub mod matcher;
