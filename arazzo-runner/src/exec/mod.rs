mod criteria;
mod http;
mod request;
mod response;
mod step;

pub use http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use request::build_request;
pub use response::{compute_outputs, evaluate_success, parse_body_json};
pub use step::{execute_step, StepFailure, StepRun};
