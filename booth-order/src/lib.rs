pub mod accounting;
pub mod cart;
pub mod session;
pub mod views;

pub use accounting::{
    effective_total, history_total, ordered_quantity, refundable_quantity, refunded_quantity,
    DashboardStats, PopularFood,
};
pub use cart::{Cart, CartError, CartItem, MAX_LINE_QUANTITY};
pub use session::{CheckStart, PaymentSession, SessionError, SessionState};
pub use views::{
    table_activity, LineBalance, OrderQuery, OrderSummary, SortBy, SortOrder, StatusFilter,
    TableActivity, TableOrder, TableOrdersView,
};
