pub mod contact;
pub mod new_subscriber;
pub mod preferences;
pub mod subscriber_email;
pub mod subscriber_name;
pub mod subscription_outcome;
