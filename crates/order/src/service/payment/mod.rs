mod command;

pub use self::command::{PaymentCommandService, PaymentCommandServiceDeps};
