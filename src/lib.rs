//! # Wolf ISM8 Gateway Library
//!
//! A Rust library for communicating with the Wolf ISM8 interface module,
//! the LAN gateway of Wolf heating, solar, ventilation and heat pump
//! systems.
//!
//! The ISM8 inverts the usual client/server roles: the module is
//! configured with the address of this library's listener and **connects
//! outward** to it, then pushes datapoint values as they change. The
//! library mirrors everything the module sends, acknowledges each
//! telegram so the module keeps sending, and writes values back for the
//! datapoints the module accepts.
//!
//! ## Features
//!
//! - **Passive by design** — the module connects to us; the library
//!   listens, mirrors and acknowledges
//! - **Complete codec** — every documented datapoint type: switches,
//!   temperatures, percentages, counters, energies, flow rates, dates,
//!   times of day and operating mode enumerations
//! - **Static registry** — all documented datapoints with device group,
//!   name, unit and writability
//! - **Lossless mirror** — undocumented datapoints are kept raw instead
//!   of being dropped
//! - **No panics** — all errors returned as `Result<T, Ism8Error>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use wolf_ism8::{Ism8, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> wolf_ism8::Result<()> {
//!     let ism8 = Ism8::new(SessionConfig::new());
//!
//!     // Fires for every datapoint value the module pushes.
//!     ism8.register_callback(|id, def, value| {
//!         let name = def.map(|d| d.name).unwrap_or("unknown");
//!         println!("datapoint {id} ({name}) = {:?}", value.value);
//!     });
//!
//!     // Listens on 0.0.0.0:12004 and serves module connections forever.
//!     ism8.serve().await
//! }
//! ```
//!
//! ## Datapoint Types
//!
//! Values travel as KNX-style encoded bytes; [`DataType`] names the
//! encodings and [`codec`] converts between bytes and [`Value`]:
//!
//! | Data type | Width | Decoded as |
//! |-----------|-------|------------|
//! | [`DataType::Bool`] | 1 | `Value::Bool` |
//! | [`DataType::Scaling`] | 1 | `Value::Percent`, 0-100 % |
//! | [`DataType::Percent`] | 1 | `Value::Percent`, plain percentage |
//! | [`DataType::Uint16`] / [`DataType::Int16`] | 2 | `Value::Integer` |
//! | [`DataType::Float16`] | 2 | `Value::Decimal`, KNX float |
//! | [`DataType::Float32`] | 4 | `Value::Decimal`, IEEE 754 |
//! | [`DataType::Int32`] | 4 | `Value::Integer` |
//! | [`DataType::FlowRate`] | 4 | `Value::Decimal`, m³/h |
//! | [`DataType::TimeOfDay`] | 3 | `Value::Time` |
//! | [`DataType::Date`] | 3 | `Value::Date` |
//! | mode enumerations | 1 | `Value::Mode`, documented label |
//!
//! ## Writing Values
//!
//! ```no_run
//! # use wolf_ism8::{Ism8, SessionConfig, Value};
//! # async fn demo(ism8: &Ism8) -> wolf_ism8::Result<()> {
//! // Hot water setpoint to 55 °C (datapoint 56, allowed 20-80).
//! ism8.write(56, &Value::Decimal(55.0)).await?;
//!
//! // Heating circuit program selection by documented label.
//! ism8.write(57, &Value::Mode("Heizbetrieb")).await?;
//!
//! // Ask the module to re-send everything it knows.
//! ism8.request_all_datapoints().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Ism8Error>`]. The library never
//! panics in public code.
//!
//! ```no_run
//! use wolf_ism8::{Ism8, Ism8Error, SessionConfig, Value};
//!
//! # async fn demo(ism8: &Ism8) {
//! match ism8.write(1, &Value::Bool(true)).await {
//!     Ok(()) => println!("written"),
//!     Err(Ism8Error::NotWritable { id }) => println!("datapoint {id} is read-only"),
//!     Err(Ism8Error::NotConnected) => println!("module not connected yet"),
//!     Err(e) => println!("error: {e}"),
//! }
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```
//! use std::time::Duration;
//! use wolf_ism8::SessionConfig;
//!
//! let config = SessionConfig::new()
//!     .bind_addr("192.168.1.10")              // Interface to listen on
//!     .port(12004)                            // The module always dials 12004
//!     .idle_timeout(Duration::from_secs(300)) // Drop silent connections
//!     .max_buffered(8192);                    // Receive buffer limit
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
mod datatype;
mod error;
pub mod registry;
mod session;
mod state;
mod telegram;
mod value;

// Public re-exports
pub use datatype::DataType;
pub use error::{Ism8Error, Result};
pub use registry::DatapointDefinition;
pub use session::{Ism8, SessionConfig, UpdateCallback, DEFAULT_PORT};
pub use state::DatapointValue;
pub use telegram::{Entry, Framer, Telegram};
pub use value::{Date, TimeOfDay, Value};
