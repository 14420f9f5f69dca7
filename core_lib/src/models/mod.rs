pub mod form;
pub mod post;
pub mod request;
pub mod response;

pub use form::{
    FieldValue, FilePart, FormFields, FormOptions, InterceptedForm, SubmissionId, Submitter,
    CONFIRM_ATTR, OPT_OUT_ATTR, SILENT_ATTR,
};
pub use post::{PostId, ScheduledPost};
pub use request::{append_query, resolve_action, RequestDescriptor};
pub use response::{RawResponse, Redirect, ResponseKind, ResponseMeta, ResponsePayload};
