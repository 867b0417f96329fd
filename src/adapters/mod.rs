//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `file_config`  | ConfigPort         | JSON file (`SEATHEAT_CONFIG`)|
//! | `hardware`     | SensorPort         | LM35 via ADC                 |
//! |                | ActuatorPort       | GPIO indicator outputs       |
//! | `log_sink`     | EventSink          | `log` facade                 |
//! | `time`         | TimePort           | monotonic system clock       |

pub mod file_config;
pub mod hardware;
pub mod log_sink;
pub mod time;
