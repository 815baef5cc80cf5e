pub mod csv_codec;
pub mod sink;
