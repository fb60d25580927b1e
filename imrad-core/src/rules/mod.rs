// Decision engine rules — per-unit scoring, flag derivation, boosting,
// resolution and suppression. Each stage is a pure function over its
// declared inputs; all state is unit-local.

pub mod boosts;
pub mod flags;
pub mod resolve;
pub mod scoring;
pub mod suppression;

pub use boosts::apply_boosts;
pub use flags::derive_flags;
pub use resolve::resolve_label;
pub use scoring::score_unit;
pub use suppression::{apply_citation_soft, looks_like_reference};
