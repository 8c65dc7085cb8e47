pub mod health;
pub mod payhero_handlers;
