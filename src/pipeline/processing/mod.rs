pub mod date_parser;
pub mod normalize;
