//! Auth middleware.
//!
//! [`required`] rejects anonymous requests with `401`. [`optional`] lets them through as
//! guests, so catalogue reads work with or without a token.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, error};

use stockroom_app::{auth::AuthServiceError, domain::users::records::UserUuid};

use crate::{extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn required(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

        return;
    };

    let Ok(state) = depot.obtain_or_500::<Arc<State>>() else {
        res.render(StatusError::internal_server_error());

        return;
    };

    let user = match state.auth.authenticate_bearer(token).await {
        Ok(user) => user,
        Err(AuthServiceError::NotFound | AuthServiceError::UnknownUser) => {
            res.render(StatusError::unauthorized().brief("Invalid API token"));

            return;
        }
        Err(AuthServiceError::Sql(source)) => {
            error!("failed to validate api token: {source}");

            res.render(StatusError::internal_server_error());

            return;
        }
    };

    depot.insert_user_uuid(user);

    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn optional(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Some(user) = resolve_viewer(req, depot).await {
        depot.insert_user_uuid(user);
    }

    ctrl.call_next(req, depot, res).await;
}

/// The shopper behind an optional token. Anything short of a valid token is a guest.
async fn resolve_viewer(req: &Request, depot: &Depot) -> Option<UserUuid> {
    let token = extract_bearer_token(req)?;
    let state = depot.obtain::<Arc<State>>().ok()?;

    match state.auth.authenticate_bearer(token).await {
        Ok(user) => Some(user),
        Err(AuthServiceError::NotFound | AuthServiceError::UnknownUser) => {
            debug!("invalid api token, continuing as guest");

            None
        }
        Err(AuthServiceError::Sql(source)) => {
            error!("failed to validate api token, continuing as guest: {source}");

            None
        }
    }
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use stockroom_app::auth::MockAuthService;

    use crate::test_helpers::{TEST_USER_UUID, state_with_auth};

    use super::*;

    #[salvo::handler]
    async fn echo_user(depot: &mut Depot, res: &mut Response) {
        let user = depot
            .viewer_uuid()
            .map_or_else(|| "guest".to_string(), |uuid| uuid.to_string());

        res.render(user);
    }

    fn make_service(auth: MockAuthService, hoop: impl Handler) -> Service {
        let router = Router::new()
            .hoop(inject(state_with_auth(auth)))
            .hoop(hoop)
            .push(Router::new().get(echo_user));

        Service::new(router)
    }

    fn accepting(token: &'static str) -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(move |candidate| candidate == token)
            .return_once(|_| Ok(TEST_USER_UUID));

        auth
    }

    fn rejecting() -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        auth
    }

    fn untouched() -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        auth
    }

    #[tokio::test]
    async fn test_required_missing_header_returns_401() {
        let res = TestClient::get("http://example.com")
            .send(&make_service(untouched(), required))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_required_non_bearer_header_returns_401() {
        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(untouched(), required))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_required_invalid_token_returns_401() {
        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer st_nope", true)
            .send(&make_service(rejecting(), required))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_required_storage_failure_returns_500() {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer st_abc", true)
            .send(&make_service(auth, required))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_required_valid_token_injects_user() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "bearer st_abc", true)
            .send(&make_service(accepting("st_abc"), required))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, TEST_USER_UUID.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_optional_without_header_is_guest() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .send(&make_service(untouched(), optional))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "guest");

        Ok(())
    }

    #[tokio::test]
    async fn test_optional_invalid_token_is_guest() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer st_nope", true)
            .send(&make_service(rejecting(), optional))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "guest");

        Ok(())
    }

    #[tokio::test]
    async fn test_optional_valid_token_injects_user() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer st_abc", true)
            .send(&make_service(accepting("st_abc"), optional))
            .await;

        assert_eq!(res.take_string().await?, TEST_USER_UUID.to_string());

        Ok(())
    }
}
