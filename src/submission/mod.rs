pub mod parser;
pub mod pipeline;
pub mod sanitizer;
pub mod validator;

pub use pipeline::SubmissionHandler;
