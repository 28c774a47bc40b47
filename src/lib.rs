//! blockscript – an embeddable brace-delimited templating engine
//!
//! Hosts feed the interpreter a user-authored string plus named context
//! values and get back rendered text and a bag of declared side-effect
//! actions. The engine provides:
//! - Single-pass bracket matching producing innermost-first nodes
//! - A `{declaration(parameter):payload}` verb grammar per node
//! - Pluggable blocks and value adapters dispatched in registration order
//! - Ordered splicing with coordinate translation instead of an AST
//! - Sync and async interpreter variants sharing one resolution algorithm
//!
//! ```
//! use blockscript::{Interpreter, ProcessOptions, block};
//! use std::collections::HashMap;
//!
//! let engine = Interpreter::new(block::defaults());
//! let response = engine
//!     .process("{if(1==1):yes|no}", HashMap::new(), ProcessOptions::default())
//!     .unwrap();
//! assert_eq!(response.body(), "yes");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod block;
pub mod error;
pub mod interface;
pub mod interpreter;
pub mod util;
pub mod verb;

pub use error::{Error, Result};
pub use interface::{Adapter, AsyncBlock, Block};
pub use interpreter::{
    ActionValue, AdapterMap, AsyncInterpreter, Context, Interpreter, Node, ProcessOptions,
    Response, build_node_tree,
};
pub use verb::Verb;

/// Current version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
