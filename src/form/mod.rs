//! Browser-side behaviour of the signup forms (hero and call-to-action),
//! kept free of any rendering so it can be driven from tests or a wasm
//! front end alike.
mod client;
mod controller;
mod dialog;

pub use client::DispatchClient;
pub use client::HttpSubscribeClient;
pub use client::SubscribeClient;
pub use controller::FormController;
pub use controller::FormState;
pub use dialog::DialogEvent;
pub use dialog::Dismissal;
pub use dialog::SuccessDialog;
pub use dialog::DEFAULT_AUTO_CLOSE_DELAY;
