pub mod context;
pub mod dialect;
pub mod error;
pub mod sanitize;
pub mod translator;

pub use self::translator::StepGenerator;
pub use context::JoinContext;
