pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::{ProcessSnapshot, SchedEvent, TickReport};
pub use observer::{Observer, check_queue, check_record, check_selection};
pub use state::{Pid, ProcessQueue, ProcessRecord, ProcessState, RecordRef, Ticks};
