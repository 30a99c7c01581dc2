//! A path-pattern dispatcher.
//!
//! Handlers are registered against path patterns. Resolving a path runs the
//! handlers of every matching rule, in registration order, against one shared
//! [`Context`]:
//!
//! ```no_run
//! use bluejacket_rs::{Dispatcher, Flow, Handler};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(None);
//! dispatcher.handle(
//!     "/users/:id",
//!     [Handler::sync(|ctx| {
//!         ctx.set("user", ctx.param("id"));
//!         Ok(Flow::Next)
//!     })],
//! )?;
//!
//! let ctx = dispatcher.resolve("/users/42?tab=posts").await?;
//! assert_eq!(ctx.get("user"), Some("42".into()));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod registry;
pub mod types;

pub use context::Context;
pub use dispatcher::{
    ConfigurationError, ConfigurationResult, DispatchError, DispatchResult, Dispatcher,
    DispatcherOptions, DispatcherOptionsBuilder, OptionsError, RegistrationMode,
};
pub use handler::{Flow, HALT_SENTINEL, Handler, HandlerResult, Rejection};
pub use matcher::Params;
pub use pattern::{Pattern, PatternError};
