//! # tfinv_runner
//!
//! External command execution for tfinv.
//!
//! Every call to `terraform` and the AWS CLI goes through the
//! [`CommandRunner`] trait so the inventory pipeline can be driven by
//! real processes or by a scripted [`MockRunner`] in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use tfinv_runner::{CommandRunner, CommandSpec, ProcessRunner, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::new(RunOptions::default().timeout(60));
//!
//!     let spec = CommandSpec::new("terraform")
//!         .args(["output", "-json"])
//!         .current_dir("../../terraform");
//!
//!     let output = runner.run_checked(&spec).await?;
//!     println!("{}", output.stdout);
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;

pub use command::{CommandSpec, RunOptions};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use process::ProcessRunner;
pub use runner::{CommandOutput, CommandRunner};
