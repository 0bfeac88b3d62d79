//! # nestkv Value
//!
//! JSON-compatible dynamic value type and text codec for nestkv.
//!
//! This crate defines the set of values a nestkv store can hold:
//! null, booleans, integers, floats, text, arrays, and objects with
//! unique string keys. Values survive a round trip through their
//! serialized text form byte-for-byte, including object key order.
//!
//! ## Usage
//!
//! ```
//! use nestkv_value::{from_json_text, to_json_text, Value};
//!
//! let value = Value::object(vec![
//!     ("name".to_string(), Value::from("Alice")),
//!     ("age".to_string(), Value::from(30)),
//! ]);
//!
//! let text = to_json_text(&value).unwrap();
//! let decoded = from_json_text(&text).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;
mod value;

pub use error::{CodecError, CodecResult};
pub use json::{from_json_text, to_json_text};
pub use value::Value;
