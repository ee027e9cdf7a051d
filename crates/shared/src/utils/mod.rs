mod gracefullshutdown;
mod logs;
mod metrics;
mod order_number;
mod otel;

pub use self::gracefullshutdown::shutdown_signal;
pub use self::logs::init_logger;
pub use self::metrics::{Labels, Method, Metrics, Status};
pub use self::order_number::generate_order_number;
pub use self::otel::{Telemetry, TracingContext};
