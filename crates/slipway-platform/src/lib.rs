pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, PlatformError, Result};
pub use http::HttpPlatformClient;
pub use traits::PlatformApi;
pub use types::{
    ApplicationUpdate, BuildConfig, CreatedProject, DeployKeyProvider, DockerProvider,
    DomainSpec, GithubAppProvider, PublicGitProvider, RemoteApplication, RemoteDomain,
    RemoteEnvironment, RemoteProject,
};
