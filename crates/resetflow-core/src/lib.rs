pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod token;
pub mod transport;
pub mod validation;

pub use client::ResetClient;
pub use config::{Endpoints, Messages, ResetflowConfig, Server};
pub use error::{ResetflowError, ResetflowResult};
pub use flow::{
    ConfirmForm, FlowOutcome, FlowSnapshot, RequestForm, ResetConfirmFlow, ResetFlow, ResetForm,
    ResetRequestFlow, SubmitStatus,
};
pub use token::ResetToken;
pub use transport::{
    Endpoint, ResetConfirmBody, ResetPayload, ResetRequestBody, ResetTransport, TransportError,
    TransportResult,
};
pub use validation::{
    validate_credential, validate_identifier, Field, FieldErrors, ValidationError,
    MIN_CREDENTIAL_LEN,
};
