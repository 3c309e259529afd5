//! Remote speech recognition: client trait, HTTP implementation, usage
//! metering.

pub mod client;
pub mod http;
pub mod quota;

pub use client::{MockRecognizer, Recognizer, ScriptedCall};
pub use http::{HttpRecognizer, encode_payload};
pub use quota::{InMemoryMeter, UsageMeter, billable_secs};
