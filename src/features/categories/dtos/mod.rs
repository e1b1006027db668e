mod category_dto;

pub use category_dto::{
    CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, DeleteCategoryRequestDto,
    DeleteOptionDto, ReorderRequestDto, UpdateCategoryDto,
};
