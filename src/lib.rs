pub mod chrome;
pub mod config;
pub mod driver;
pub mod errors;
pub mod flow;
pub mod screenshot;
pub mod scripts;
pub mod session;

pub use chrome::ChromeDriver;
pub use config::{ArtifactConfig, BrowserConfig, TargetConfig, VerifyConfig, Viewport};
pub use driver::BrowserDriver;
pub use errors::{Result, VerifyError};
pub use flow::{run, VerifyReport};
pub use session::SignInSession;
