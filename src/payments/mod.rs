//! Payment provider clients. Both are opaque pass-throughs over the
//! providers' HTTP APIs: the service forwards a charge request and reports
//! the returned token/status back to the caller, nothing more.

pub mod midtrans;
pub mod stripe;

pub use midtrans::MidtransClient;
pub use stripe::StripeClient;
