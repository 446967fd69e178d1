mod data_file;
pub use data_file::*;

mod sync;
pub use sync::*;
