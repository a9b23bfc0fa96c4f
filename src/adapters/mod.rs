//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements         | Connects to                     |
//! |--------------|--------------------|---------------------------------|
//! | `gpio`       | OutputPin (HAL)    | ESP32 GPIO / in-memory pin      |
//! | `hardware`   | RelayActuator      | Relay driver                    |
//! |              | StatusIndicator    | Status LED driver               |
//! | `log_sink`   | EventSink          | Serial / tracing log output     |
//! | `nmea_gps`   | GpsSource          | NMEA UART stream or replay file |
//! | `time`       | Clock, DelayNs     | ESP32 system timer / Instant    |
//! | `udp_radio`  | RadioLink          | UDP datagrams (host simulation) |

pub mod gpio;
pub mod hardware;
pub mod log_sink;
pub mod nmea_gps;
pub mod time;
pub mod udp_radio;
