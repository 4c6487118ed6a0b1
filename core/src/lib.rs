pub mod diff;
pub mod format;
pub mod imports;
pub mod index;
pub mod lint;
pub mod resolver;
