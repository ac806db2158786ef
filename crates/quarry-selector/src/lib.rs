//! Quarry selector compiler.
//!
//! Turns CSS selector text into locator plans a document-tree driver can run,
//! even when the driver's native CSS support is incomplete:
//!
//! 1. [`parser`] builds a condition tree from the selector text.
//! 2. [`pseudo`] resolves each pseudo-class to a query strategy or a filter.
//! 3. [`SelectorCompiler`] probes the engine once per strategy (memoized in a
//!    [`NativeSupportCache`]) and renders every compound as a native query,
//!    or as a path query when something in it is not natively supported.
//! 4. [`CompiledSelector::execute`] walks the combinators, applies filters,
//!    and returns matches in first-seen order without duplicates.
//!
//! The driver is abstracted by the [`QueryEngine`] trait.

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod escape;
pub mod filter;
pub mod locator;
pub mod nth;
pub mod parser;
pub mod plan;
pub mod pseudo;
pub mod traversal;

pub use cache::NativeSupportCache;
pub use compiler::SelectorCompiler;
pub use config::CompilerConfig;
pub use engine::{QueryEngine, QueryKind};
pub use error::{EngineError, SelectorError};
pub use filter::CssFilter;
pub use locator::Locator;
pub use nth::NthArgument;
pub use parser::{parse_relative_selector_list, parse_selector_list};
pub use plan::{CompiledSelector, PlanStep, SelectorPlan};
