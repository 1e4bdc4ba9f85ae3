mod branch_dto;

pub use branch_dto::{
    BranchListResponseDto, BranchOwnerDto, BranchResponseDto, BranchSortField, CreateBranchDto,
    ListBranchesQuery, UpdateBranchDto,
};
