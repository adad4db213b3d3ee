mod aggregate;
mod assemble;
mod error;
mod format;
mod graph;
mod intent;
mod linked;
mod packages;
mod propagate;

pub use aggregate::aggregate_changesets;
pub use assemble::{PlanConfig, ReleasePlanner, assemble};
pub use error::{PlanError, Result};
pub use graph::{Dependent, DependentsGraph};
pub use intent::{IntentMap, ReleaseIntent};
pub use packages::PackageSet;
