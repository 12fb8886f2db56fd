mod admin;
mod startup;
mod subscriptions;
mod unsubscribe;
