mod bot;
pub mod commands;
pub mod notifier;

pub use bot::{Context, Data, create_framework};
pub use notifier::{MessageSender, NotificationMessage, Notifier};
