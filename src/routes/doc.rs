use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        orders::{
            CreateOrderRequest, GinDetailsInput, OrderActionRequest, OrderItemInput, OrdersPage,
            UpdateOrderRequest, VendorDetailsInput,
        },
        vendors::{
            CreateVendorRequest, UpdateVendorRequest, VendorRatingRequest, VendorStatusRequest,
        },
    },
    middleware::auth::ACCESS_TOKEN_COOKIE,
    models::{
        Department, GinDetails, Order, OrderItem, OrderStatus, Role, User, Vendor,
        VendorDetails, VendorStatus,
    },
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, params, vendors},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
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
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        orders::create_order,
        orders::list_orders,
        orders::recent_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::handle_order_action,
        vendors::list_vendors,
        vendors::create_vendor,
        vendors::get_vendor,
        vendors::update_vendor,
        vendors::delete_vendor,
        vendors::update_vendor_status,
        vendors::update_vendor_rating
    ),
    components(
        schemas(
            User,
            Role,
            Department,
            Order,
            OrderItem,
            OrderStatus,
            GinDetails,
            VendorDetails,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderActionRequest,
            GinDetailsInput,
            VendorDetailsInput,
            OrderItemInput,
            OrdersPage,
            Vendor,
            VendorStatus,
            CreateVendorRequest,
            UpdateVendorRequest,
            VendorStatusRequest,
            VendorRatingRequest,
            health::HealthData,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrdersPage>,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<Vendor>
        )
    ),
    security(
        ("bearer_auth" = []),
        ("cookie_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and session endpoints"),
        (name = "Orders", description = "Purchase orders and HOD decisions"),
        (name = "Vendors", description = "Vendor directory kept by store managers"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
