pub mod callback;
pub mod payment_record;

pub use callback::InboundCallback;
pub use payment_record::{CallbackAck, FailureAudit, PaymentRecord, PaymentStatus};
