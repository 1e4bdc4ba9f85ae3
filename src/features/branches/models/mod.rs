mod branch;

pub use branch::BranchWithOwnerRow;
