//! Countflow: a parameterized counter whose direction, wrap condition, increment and update source are chosen at
//! elaboration time.
//!
//! A [`CounterConfig`] is validated once into a [`ValidatedConfig`]. A [`Counter`] then owns its count and
//! advances it one step at a time; [`Chain`] wires counters so that each stage counts the wraps of the previous
//! one.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(variant_size_differences)]
#![deny(warnings)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::private_doc_tests)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]

pub mod chain;
pub mod config;
pub mod counter;
pub mod fsm;
pub mod num;
pub mod port;

pub use chain::{Chain, ChainError, ChainOutput};
pub use config::{validate, ChangeCtrl, ConfigError, CountType, CounterConfig, CtrlLoc, ValidatedConfig, WrapCtrl};
pub use counter::{resolve_inc, resolve_max, resolve_wrap_to, Counter};
pub use fsm::Fsm;
pub use port::{CounterInput, CounterOutput, CtrlIn, CtrlOut, CtrlShape, Port, PortError, Ports};

static_assertions::assert_impl_all!(ValidatedConfig: Copy, Send, Sync);
static_assertions::assert_impl_all!(Counter: Clone, Send, Sync);
static_assertions::assert_impl_all!(Chain: Clone, Send, Sync);
static_assertions::assert_impl_all!(ConfigError: std::error::Error, Send, Sync);
