//! UserServiceRpc demo service.
//!
//! The canonical zrpc example: a user service exposing a single `Login`
//! method. The provider binary hosts it, the caller binary invokes it
//! through the registry; both read the same `-i <config>` file.

use serde::{Deserialize, Serialize};
use zrpc_provider::{ServiceBuilder, ServiceDescriptor};

pub const SERVICE_NAME: &str = "UserServiceRpc";
pub const LOGIN_METHOD: &str = "Login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCode {
    pub errcode: i32,
    pub errmsg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub pwd: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub result: ResultCode,
    pub success: bool,
}

/// Builds the service descriptor hosted by the provider binary.
pub fn user_service() -> ServiceDescriptor {
    ServiceBuilder::new(SERVICE_NAME)
        .method(LOGIN_METHOD, |request: LoginRequest| {
            tracing::info!(name = %request.name, "doing local service: Login");
            let success = login(&request.name, &request.pwd);
            Ok(LoginResponse {
                result: ResultCode {
                    errcode: 0,
                    errmsg: String::new(),
                },
                success,
            })
        })
        .build()
}

// Simulated login logic.
fn login(name: &str, _pwd: &str) -> bool {
    !name.is_empty()
}
