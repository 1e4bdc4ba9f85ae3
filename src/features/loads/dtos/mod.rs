mod load_dto;

pub use load_dto::{
    ChangeLoadStatusDto, ChangeLoadStatusResponseDto, CreateLoadDto, CreateLoadResponseDto,
    ListLoadsQuery, LoadDetailsResponseDto, LoadFileDto, LoadFileResponseDto, LoadListResponseDto,
    LoadLocationDto, LoadLocationResponseDto, LoadResponseDto, LoadSortField,
    UpdateLoadLocationDto, UpdateLoadDto,
};
