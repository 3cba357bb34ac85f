// comping-core/src/parser/mod.rs

pub mod symbol;

pub use symbol::{
    parse_chord_name, parse_chord_symbol, parse_quality, parse_verbose_chord_name,
    simplify_quality,
};
