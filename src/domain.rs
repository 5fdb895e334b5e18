pub mod batch;
pub mod recipient_email;
pub mod recipient_record;
pub mod start_time;

pub use batch::{Batch, BatchAccumulator};
pub use recipient_email::RecipientEmail;
pub use recipient_record::{
    RecipientAddress, RecipientColumn, RecipientFieldError, RecipientFields, RecipientRecord,
};
pub use start_time::StartTime;
