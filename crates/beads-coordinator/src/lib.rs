//! Per-repo Coordinator (C10) and the C11 installation-credential resolver
//! contract (SPEC_FULL §4.9, §4.10).

pub mod coordinator;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod state;

pub use coordinator::{spawn, CoordinatorHandle};
pub use error::{AuthError, CoordinatorError, ErrorKind, Result};
pub use registry::CoordinatorRegistry;
pub use resolver::{CachingResolver, InstallationResolver, UpstreamCredential};
pub use state::CoordinatorState;
