pub mod bus;
pub mod lifecycle;


pub use bus::{DispatchOutcome, EventBus, Listener, ListenerId};
pub use lifecycle::{AjaxEvent, EventDetail, EventKind};
