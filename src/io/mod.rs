// Purpose - external interfaces, buffer layout, format conversions

pub mod buffer;
pub mod converter;
pub mod midi;

pub use buffer::AudioBuffer;
