mod categories;
mod new_subscriber;
mod subscriber;
mod subscriber_email;
mod subscriber_name;

pub use categories::Categories;
pub use new_subscriber::NewSubscriber;
pub use subscriber::Subscriber;
pub use subscriber_email::{NormalizedEmail, SubscriberEmail};
pub use subscriber_name::SubscriberName;
