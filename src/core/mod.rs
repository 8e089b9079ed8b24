pub mod catalog;
pub mod checkout;
pub mod form;
pub mod format;
pub mod fragment;
pub mod pricing;
pub mod session;

pub use crate::domain::model::{
    BillingPeriod, CardNetwork, CheckoutState, Money, OrderItem, OrderReceipt, PaymentMethod,
    Step, CURRENCY_SYMBOL, MONTHLY_MARKER,
};
pub use crate::domain::ports::{CheckoutHost, FragmentSink, FragmentSource};
pub use crate::utils::error::Result;
