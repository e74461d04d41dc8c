pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod model;
pub mod repository;
pub mod statement;
pub mod types;

// re-export key types
pub use config::{ArrearsConfig, FeeTier};
pub use decimal::{Money, Rate};
pub use engine::{LedgerEngine, PaymentInput};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{
    ArrearsEngine, ArrearsOutcome, LedgerReplayer, PaymentAllocator, ScheduleGenerator,
};
pub use model::{Contract, Installment, Payment};
pub use repository::{LedgerStore, MemoryLedger};
pub use statement::ContractStatement;
pub use types::{
    AllocationReport, ContractId, ContractStatus, InstallmentId, InstallmentStatus,
    PaymentId, PaymentMethod,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
