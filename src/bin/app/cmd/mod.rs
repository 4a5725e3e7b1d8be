pub mod kh;
pub mod poly;
