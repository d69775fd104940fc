/// Filter module - full-screen post-process effects and ping-pong chains

pub mod filter;
pub mod filter_chain;

pub use filter::{build_fragment_source, BlendMode, Filter, FilterKind, FILTER_CODE_MARKER, FILTER_FRAGMENT_TEMPLATE};
pub use filter_chain::{FilterChain, IterationCallback};
