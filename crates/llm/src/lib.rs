pub mod categorize;
pub mod provider;
pub mod providers;

pub use categorize::{
    CategorizeError, CategorizeRequest, CategorizeResponse, Categorizer, ErrorResponse,
    RfpCategorizer,
};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
