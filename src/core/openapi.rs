use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::branches::{dtos as branches_dtos, handlers as branches_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::loads::{
    dtos as loads_dtos, handlers as loads_handlers, models as loads_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{MessageDto, SortOrder};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        users_handlers::list_users,
        users_handlers::get_self,
        users_handlers::update_self,
        users_handlers::update_user,
        users_handlers::delete_user,
        // Branches
        branches_handlers::list_branches,
        branches_handlers::create_branch,
        branches_handlers::update_branch,
        branches_handlers::delete_branch,
        // Loads
        loads_handlers::list_loads,
        loads_handlers::get_load,
        loads_handlers::create_load,
        loads_handlers::update_load,
        loads_handlers::change_load_status,
        loads_handlers::delete_load,
        // Files
        files_handlers::create_upload_url,
        files_handlers::create_download_url,
        files_handlers::delete_file,
    ),
    components(schemas(
        MessageDto,
        SortOrder,
        users_dtos::UserSortField,
        branches_dtos::BranchSortField,
        loads_dtos::LoadSortField,
        users_dtos::UserRole,
        users_dtos::UserBranchDto,
        users_dtos::UserResponseDto,
        users_dtos::UserListItemDto,
        users_dtos::UserListResponseDto,
        users_dtos::UpdateUserDto,
        users_dtos::SelfUpdateUserDto,
        branches_dtos::BranchOwnerDto,
        branches_dtos::BranchResponseDto,
        branches_dtos::BranchListResponseDto,
        branches_dtos::CreateBranchDto,
        branches_dtos::UpdateBranchDto,
        loads_models::LoadStatus,
        loads_dtos::LoadLocationDto,
        loads_dtos::UpdateLoadLocationDto,
        loads_dtos::LoadFileDto,
        loads_dtos::LoadFileResponseDto,
        loads_dtos::LoadLocationResponseDto,
        loads_dtos::LoadResponseDto,
        loads_dtos::LoadDetailsResponseDto,
        loads_dtos::LoadListResponseDto,
        loads_dtos::CreateLoadDto,
        loads_dtos::UpdateLoadDto,
        loads_dtos::CreateLoadResponseDto,
        loads_dtos::ChangeLoadStatusDto,
        loads_dtos::ChangeLoadStatusResponseDto,
        files_dtos::UploadFileDto,
        files_dtos::UploadUrlResponseDto,
        files_dtos::DownloadUrlResponseDto,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "User management"),
        (name = "branches", description = "Branch management"),
        (name = "loads", description = "Load management"),
        (name = "files", description = "Load document storage"),
    )
)]
pub struct ApiDoc;

/// Adds the bearer scheme the gateway terminates in front of this service
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Applies runtime-configured title/version/description to the document
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
