//! Custom request extractors.

mod client_info;
mod params;
mod validated_json;

pub use client_info::client_ip;
pub use params::{Path, Query};
pub use validated_json::{not_blank, ValidatedJson};
