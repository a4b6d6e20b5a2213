pub mod autodeploy;
pub mod batch;
pub mod envvars;
pub mod error;
pub mod reconciler;
pub mod settings;
pub mod source;

pub use autodeploy::{AutoDeployInstaller, DisabledAutoDeploy};
pub use batch::BatchDriver;
pub use envvars::{ResolvedEnvironment, resolve_environment};
pub use error::ReconcileError;
pub use reconciler::{INITIAL_DEPLOY_TITLE, Reconciler};
pub use settings::{ReconcilerSettings, SECRET_PREFIX, SecretStore};
pub use source::{SourceStrategy, select_strategy};
