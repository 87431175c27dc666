pub mod alerts;
pub mod notification;
pub mod readings;
pub mod status;
