pub mod order;
pub mod quote;

pub use order::{Order, OrderRequest, OrderStatus, OrderType, DEFAULT_SLIPPAGE};
pub use quote::{calculate_amount_out, DexKind, Quote, Settlement};
