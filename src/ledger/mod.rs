pub mod allocation;
pub mod arrears;
pub mod replay;
pub mod schedule;

pub use allocation::PaymentAllocator;
pub use arrears::{ArrearsEngine, ArrearsOutcome};
pub use replay::LedgerReplayer;
pub use schedule::ScheduleGenerator;
