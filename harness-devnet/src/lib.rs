//! In-process devnet for the contract harness.
//!
//! [`DevnetNode`] and [`DevnetCompiler`] implement the same [`NodeApi`] and
//! [`CompilerApi`] traits as the HTTP clients, so SDK code and scenarios run
//! unchanged against them. The devnet has no VM: contracts whose main
//! contract name matches a native emulation (see [`native`]) execute, any
//! other contract deploys but reverts when called.
//!
//! ```
//! use harness_devnet::Devnet;
//!
//! let devnet = Devnet::new("ae_devnet");
//! assert_eq!(devnet.node().height(), 0);
//! let _node = devnet.node_api();
//! let _compiler = devnet.compiler_api();
//! ```

pub mod codec;
pub mod compiler;
pub mod error;
pub mod native;
pub mod node;
pub mod scanner;
pub mod state;

pub use compiler::DevnetCompiler;
pub use error::{ExecError, ExecResult};
pub use native::{NftContract, ReceiverContract};
pub use node::{DevnetNode, DEVNET_NODE_VERSION};
pub use scanner::{scan, ScannedContract};

use harness_rpc::{CompilerApi, NodeApi};
use std::sync::Arc;

/// A node and a compiler sharing one network id.
#[derive(Debug, Clone)]
pub struct Devnet {
    node: Arc<DevnetNode>,
    compiler: Arc<DevnetCompiler>,
}

impl Devnet {
    #[must_use]
    pub fn new<S: Into<String>>(network_id: S) -> Self {
        Self::with_node(DevnetNode::new(network_id))
    }

    /// Wraps a node configured by the caller, e.g. with an inclusion delay.
    #[must_use]
    pub fn with_node(node: DevnetNode) -> Self {
        Self {
            node: Arc::new(node),
            compiler: Arc::new(DevnetCompiler::new()),
        }
    }

    #[must_use]
    pub fn node(&self) -> &DevnetNode {
        &self.node
    }

    #[must_use]
    pub fn compiler(&self) -> &DevnetCompiler {
        &self.compiler
    }

    /// The node as a transport for sessions.
    #[must_use]
    pub fn node_api(&self) -> Arc<dyn NodeApi> {
        self.node.clone()
    }

    /// The compiler as a transport for sessions.
    #[must_use]
    pub fn compiler_api(&self) -> Arc<dyn CompilerApi> {
        self.compiler.clone()
    }
}
