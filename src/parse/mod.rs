pub mod domain;
pub mod intent;
pub mod parameters;
pub mod style_command;

pub use domain::{classify_command, domain_scores};
pub use intent::classify_intent;
pub use parameters::{
    extract_colors, extract_numbers, extract_parameters, extract_positions, extract_shapes,
    extract_sizes, extract_timing, ExtractedParameters,
};
pub use style_command::{parse_style_command, StyleCommand};
