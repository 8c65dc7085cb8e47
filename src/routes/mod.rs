pub mod payhero;
