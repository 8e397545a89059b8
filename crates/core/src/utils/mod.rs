pub mod date_format;
pub mod time_utils;
