pub mod clerk;
pub mod postgres;
pub mod svix;
