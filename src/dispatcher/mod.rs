mod errors;
mod instances;
mod options;
mod service;

pub use errors::{ConfigurationError, ConfigurationResult, DispatchError, DispatchResult};
pub use options::{DispatcherOptions, DispatcherOptionsBuilder, OptionsError, RegistrationMode};
pub use service::Dispatcher;
