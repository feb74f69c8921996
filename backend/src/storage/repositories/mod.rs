pub mod instance_repository;
pub mod reminder_repository;
pub mod subscription_repository;

pub use instance_repository::InstanceRepository;
pub use reminder_repository::ReminderRepository;
pub use subscription_repository::SubscriptionRepository;
