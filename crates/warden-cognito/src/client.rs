//! HTTP client for the user pool JSON protocol.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use warden_core::AuthResult;

use crate::model::{
    AttributeType, ConfirmSignUpRequest, ErrorResponse, GetUserRequest, InitiateAuthRequest,
    InitiateAuthResponse, REFRESH_TOKEN_AUTH, RemoteUser, SignUpRequest, SignUpResponse,
    USER_PASSWORD_AUTH,
};
use crate::{CognitoConfig, Error, Result, TRACING_TARGET_CLIENT};

/// Content type of every request.
const AMZ_JSON: &str = "application/x-amz-json-1.1";
/// Header naming the invoked operation.
const AMZ_TARGET: &str = "x-amz-target";
/// Prefix of every operation name.
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
/// Header some endpoints use instead of `__type`.
const AMZN_ERROR_TYPE: &str = "x-amzn-errortype";

struct CognitoClientInner {
    http: Client,
    endpoint: Url,
    config: CognitoConfig,
}

/// Client for a Cognito-compatible user pool.
///
/// Only public app-client operations are used, so no request signing is
/// needed. Cloning is cheap.
#[derive(Clone)]
pub struct CognitoClient {
    inner: Arc<CognitoClientInner>,
}

/// Result of a sign-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResult {
    /// Pool-assigned subject.
    pub user_sub: String,
    /// Whether the user can sign in without a confirmation code.
    pub user_confirmed: bool,
}

impl CognitoClient {
    /// Validates the configuration and builds the HTTP client.
    pub fn new(config: CognitoConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("warden/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %endpoint,
            region = %config.cognito_region,
            user_pool_id = ?config.cognito_user_pool_id,
            "User pool client created"
        );

        Ok(Self {
            inner: Arc::new(CognitoClientInner {
                http,
                endpoint,
                config,
            }),
        })
    }

    /// Returns the client configuration.
    #[inline]
    pub fn config(&self) -> &CognitoConfig {
        &self.inner.config
    }

    fn client_id(&self) -> &str {
        &self.inner.config.cognito_client_id
    }

    /// Signs in with a username (or email alias) and password.
    ///
    /// Returns tokens, or a challenge the caller must answer.
    pub async fn initiate_password_auth(&self, username: &str, password: &str) -> Result<AuthResult> {
        let request = InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: self.client_id(),
            auth_parameters: HashMap::from([("USERNAME", username), ("PASSWORD", password)]),
        };

        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;
        into_auth_result(response)
    }

    /// Exchanges a refresh token for fresh access and id tokens.
    pub async fn initiate_refresh_auth(&self, refresh_token: &str) -> Result<AuthResult> {
        let request = InitiateAuthRequest {
            auth_flow: REFRESH_TOKEN_AUTH,
            client_id: self.client_id(),
            auth_parameters: HashMap::from([("REFRESH_TOKEN", refresh_token)]),
        };

        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;
        into_auth_result(response)
    }

    /// Registers a user with the given attributes.
    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        user_attributes: Vec<AttributeType>,
    ) -> Result<SignUpResult> {
        let request = SignUpRequest {
            client_id: self.client_id(),
            username,
            password,
            user_attributes,
        };

        let response: SignUpResponse = self.call("SignUp", &request).await?;
        Ok(SignUpResult {
            user_sub: response.user_sub,
            user_confirmed: response.user_confirmed,
        })
    }

    /// Confirms a registration with the code delivered to the user.
    pub async fn confirm_sign_up(&self, username: &str, confirmation_code: &str) -> Result<()> {
        let request = ConfirmSignUpRequest {
            client_id: self.client_id(),
            username,
            confirmation_code,
        };

        let _: serde_json::Value = self.call("ConfirmSignUp", &request).await?;
        Ok(())
    }

    /// Fetches the profile of the user owning `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<RemoteUser> {
        self.call("GetUser", &GetUserRequest { access_token }).await
    }

    async fn call<Req, Resp>(&self, operation: &'static str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let started_at = Instant::now();
        let body = serde_json::to_vec(request)?;

        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON))
            .header(AMZ_TARGET, format!("{TARGET_PREFIX}.{operation}"))
            .body(body)
            .send()
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    operation,
                    timeout = err.is_timeout(),
                    connect = err.is_connect(),
                    "User pool request failed"
                );
            })?;

        let status = response.status();
        let error_type_header = response
            .headers()
            .get(AMZN_ERROR_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            operation,
            status = status.as_u16(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "User pool request completed"
        );

        if status.is_success() {
            let body = if bytes.is_empty() { &b"{}"[..] } else { &bytes[..] };
            return Ok(serde_json::from_slice(body)?);
        }

        let document: ErrorResponse = serde_json::from_slice(&bytes).unwrap_or_default();
        let error_type = document
            .error_type
            .or(error_type_header)
            .unwrap_or_else(|| "UnknownError".to_owned());
        let message = document
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());

        let error = Error::api(status.as_u16(), &error_type, message);
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            operation,
            status = status.as_u16(),
            error_type = error.error_type().unwrap_or_default(),
            "User pool rejected the request"
        );

        Err(error)
    }
}

fn into_auth_result(response: InitiateAuthResponse) -> Result<AuthResult> {
    if let Some(challenge_name) = response.challenge_name {
        return Ok(AuthResult::challenge(
            challenge_name,
            response.session,
            response.challenge_parameters,
        ));
    }

    response
        .authentication_result
        .map(AuthResult::from)
        .ok_or_else(|| Error::UnexpectedResponse("neither tokens nor a challenge".into()))
}

impl fmt::Debug for CognitoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CognitoClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    //! A local stand-in for the user pool, used by the client and provider
    //! tests.

    use std::net::SocketAddr;

    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    fn error(error_type: &str, message: &str) -> (StatusCode, String) {
        let body = json!({ "__type": error_type, "message": message });
        (StatusCode::BAD_REQUEST, body.to_string())
    }

    fn ok(body: Value) -> (StatusCode, String) {
        (StatusCode::OK, body.to_string())
    }

    fn tokens(refresh: bool) -> Value {
        let mut result = json!({
            "AccessToken": "access-1",
            "IdToken": "id-1",
            "TokenType": "Bearer",
            "ExpiresIn": 3600
        });
        if refresh {
            result["RefreshToken"] = json!("refresh-1");
        }
        json!({ "AuthenticationResult": result, "ChallengeParameters": {} })
    }

    async fn handle(headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
        if headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) != Some(AMZ_JSON) {
            return (StatusCode::UNSUPPORTED_MEDIA_TYPE, String::new());
        }
        let Ok(request) = serde_json::from_slice::<Value>(&body) else {
            return error("SerializationException", "bad body");
        };
        if request["ClientId"].is_string() && request["ClientId"] != "test-client" {
            return error("ResourceNotFoundException", "unknown client");
        }

        let target = headers
            .get(AMZ_TARGET)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let params = &request["AuthParameters"];

        match target {
            "AWSCognitoIdentityProviderService.InitiateAuth" => {
                match request["AuthFlow"].as_str() {
                    Some(USER_PASSWORD_AUTH) => match params["USERNAME"].as_str() {
                        Some("alice@example.com") if params["PASSWORD"] == "s3cret!" => {
                            ok(tokens(true))
                        }
                        Some("mfa@example.com") => ok(json!({
                            "ChallengeName": "SMS_MFA",
                            "Session": "session-1",
                            "ChallengeParameters": { "CODE_DELIVERY_DESTINATION": "+*******0100" }
                        })),
                        Some("ghost@example.com") => {
                            error("UserNotFoundException", "User does not exist.")
                        }
                        _ => error("NotAuthorizedException", "Incorrect username or password."),
                    },
                    Some(REFRESH_TOKEN_AUTH) if params["REFRESH_TOKEN"] == "refresh-1" => {
                        ok(tokens(false))
                    }
                    Some(REFRESH_TOKEN_AUTH) => {
                        error("NotAuthorizedException", "Invalid Refresh Token")
                    }
                    _ => error("InvalidParameterException", "unsupported flow"),
                }
            }
            "AWSCognitoIdentityProviderService.SignUp" => {
                if request["Username"] == "taken@example.com" {
                    return error("UsernameExistsException", "User already exists");
                }
                if request["Password"].as_str().is_some_and(|p| p.len() < 8) {
                    return error("InvalidPasswordException", "Password too short");
                }
                ok(json!({ "UserConfirmed": false, "UserSub": "sub-123" }))
            }
            "AWSCognitoIdentityProviderService.ConfirmSignUp" => {
                if request["ConfirmationCode"] == "123456" {
                    ok(json!({}))
                } else {
                    error("CodeMismatchException", "Invalid verification code provided")
                }
            }
            "AWSCognitoIdentityProviderService.GetUser" => {
                if request["AccessToken"] == "access-1" {
                    ok(json!({
                        "Username": "alice",
                        "UserAttributes": [
                            { "Name": "email", "Value": "alice@example.com" },
                            { "Name": "sub", "Value": "sub-123" }
                        ]
                    }))
                } else {
                    error("NotAuthorizedException", "Invalid Access Token")
                }
            }
            _ => error("UnknownOperationException", "unknown operation"),
        }
    }

    async fn serve(app: Router) -> anyhow::Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(addr)
    }

    /// Starts the stub user pool and returns a client pointed at it.
    pub(crate) async fn stub_client() -> anyhow::Result<CognitoClient> {
        let addr = serve(Router::new().route("/", post(handle))).await?;
        let config = CognitoConfig::new("test-client").with_endpoint(format!("http://{addr}/"));
        Ok(CognitoClient::new(config)?)
    }

    #[tokio::test]
    async fn password_auth_returns_tokens() -> anyhow::Result<()> {
        let client = stub_client().await?;
        let auth = client
            .initiate_password_auth("alice@example.com", "s3cret!")
            .await?;

        assert!(!auth.is_challenge());
        assert_eq!(auth.access_token.as_deref(), Some("access-1"));
        assert_eq!(auth.id_token.as_deref(), Some("id-1"));
        assert_eq!(auth.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(auth.expires_in, Some(3600));
        Ok(())
    }

    #[tokio::test]
    async fn challenge_is_passed_through() -> anyhow::Result<()> {
        let client = stub_client().await?;
        let auth = client.initiate_password_auth("mfa@example.com", "pw").await?;

        assert!(auth.is_challenge());
        assert_eq!(auth.challenge_name.as_deref(), Some("SMS_MFA"));
        assert_eq!(auth.session.as_deref(), Some("session-1"));
        assert!(auth.challenge_parameters.contains_key("CODE_DELIVERY_DESTINATION"));
        assert!(auth.access_token.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_requests_carry_the_exception_name() -> anyhow::Result<()> {
        let client = stub_client().await?;

        let err = client
            .initiate_password_auth("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), Some("NotAuthorizedException"));

        let err = client
            .sign_up("taken@example.com", "long-enough", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), Some("UsernameExistsException"));

        let err = client
            .confirm_sign_up("alice@example.com", "000000")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), Some("CodeMismatchException"));
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_confirm_and_get_user() -> anyhow::Result<()> {
        let client = stub_client().await?;

        let result = client
            .sign_up(
                "bob@example.com",
                "long-enough",
                vec![AttributeType::new("email", "bob@example.com")],
            )
            .await?;
        assert_eq!(result.user_sub, "sub-123");
        assert!(!result.user_confirmed);

        client.confirm_sign_up("bob@example.com", "123456").await?;

        let user = client.get_user("access-1").await?;
        assert_eq!(user.username, "alice");
        assert_eq!(user.attribute("email"), Some("alice@example.com"));
        assert_eq!(user.attribute("phone_number"), None);
        Ok(())
    }

    #[tokio::test]
    async fn server_errors_and_transport_failures() -> anyhow::Result<()> {
        let failing = Router::new().route(
            "/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "{}") }),
        );
        let addr = serve(failing).await?;
        let client = CognitoClient::new(
            CognitoConfig::new("test-client").with_endpoint(format!("http://{addr}/")),
        )?;
        let err = client.get_user("access-1").await.unwrap_err();
        assert_eq!(err.kind(), warden_core::ErrorKind::Unavailable);

        let closed = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
        let client = CognitoClient::new(
            CognitoConfig::new("test-client")
                .with_endpoint(format!("http://{closed}/"))
                .with_timeout_secs(2),
        )?;
        let err = client.get_user("access-1").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert_eq!(err.kind(), warden_core::ErrorKind::Unavailable);
        Ok(())
    }
}
