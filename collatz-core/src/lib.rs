pub mod bignum;
pub mod cancel;
pub mod checkpoint;
pub mod controller;
pub mod trajectory;
pub mod utils;

pub use bignum::BigUnsigned;
pub use cancel::{CancellationSignal, CancellationToken, Signal};
pub use controller::{InitialValue, RunConfig, RunController, RunOutcome, RunReport};
pub use trajectory::{run_trajectory, ComputationState, LoopOutcome};
