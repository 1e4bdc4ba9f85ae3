mod user_dto;

pub use user_dto::{
    ListUsersQuery, SelfUpdateUserDto, UpdateUserDto, UserBranchDto, UserListItemDto,
    UserListResponseDto, UserResponseDto, UserRole, UserSortField,
};
