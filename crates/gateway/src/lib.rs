pub mod auth_api;
pub mod gateway;
pub mod token;

pub use auth_api::{AuthApi, HttpAuthApi, RefreshOutcome};
pub use gateway::{AuthGateway, Dispatch, GatewayRequest, GatewayResponse, ReqwestDispatch};
pub use token::{InMemoryTokenStore, TokenSet, TokenStore};
