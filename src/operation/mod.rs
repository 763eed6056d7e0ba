mod async_op;
mod state;

pub use async_op::{AsyncOperation, OperationError, RemoteCall, SettlementPolicy};
pub use state::{ErrorInfo, OperationState, Phase};
