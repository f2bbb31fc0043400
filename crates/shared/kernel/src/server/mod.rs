pub mod health;
pub mod json;
pub mod problem;
pub mod router;
pub mod state;
pub mod validation;

pub use json::ApiJson;
pub use problem::ProblemDetails;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
pub use validation::{ValidJson, Validated, ValidationErrors, Validator};
