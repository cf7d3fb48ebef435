//! # stackweave-sdk
//!
//! Public SDK for using Stackweave as a Rust library.
//!
//! Provides the main entry points:
//! - [`StackBuilder`](builder::StackBuilder): Fluent API for declaring a stack.
//! - [`App`](app::App): Declares stacks, resolves them, and synthesizes templates.
//! - [`Deployer`](deployer::Deployer): Provisions a resolved app through a
//!   [`ProvisioningEngine`](engine::ProvisioningEngine), emitting
//!   [`DeploymentEvent`](event::DeploymentEvent)s.
//! - [`topology`]: The reference web application built from a
//!   [`DeploymentConfig`](stackweave_common::config::DeploymentConfig).
//!
//! # Example
//!
//! ```rust,no_run
//! use stackweave_common::types::Environment;
//! use stackweave_compose::construct::object_store::data_lake_bucket;
//! use stackweave_sdk::app::App;
//! use stackweave_sdk::builder::StackBuilder;
//!
//! # fn main() -> stackweave_common::error::Result<()> {
//! let env = Environment::new("123456789012", "us-east-1");
//! let lake = StackBuilder::new("S3BucketStack", env)
//!     .group(data_lake_bucket("lake", "my-lake")?)
//!     .output("BucketName", "${lake}")
//!     .build()?;
//!
//! let mut app = App::new();
//! app.declare(lake);
//! let templates = app.synth()?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod builder;
pub mod deployer;
pub mod engine;
pub mod event;
pub mod topology;
