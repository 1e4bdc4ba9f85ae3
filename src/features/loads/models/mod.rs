mod load;

pub use load::{LoadFileRow, LoadRow, LoadStatus};
