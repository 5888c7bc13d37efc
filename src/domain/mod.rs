pub mod event;
pub mod platform;

pub use event::{EventRecord, RawEvent, DETAILS_SENTINEL, OTHER_EVENT_TYPE};
pub use platform::Platform;
