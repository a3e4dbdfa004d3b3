pub mod upload;
pub mod uploads;
pub mod videos;
