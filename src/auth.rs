use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::LostFoundApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{SignInRequest, SignUpRequest};
use crate::session::{Credential, SessionStore};

/// The subset of token claims the client looks at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Read claims without verifying the signature; the server owns the key.
fn peek_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|d| d.claims)
}

/// True when `token` is a JWT whose `exp` lies before `now`. Opaque tokens never expire here.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    peek_claims(token)
        .and_then(|c| c.exp)
        .map(|exp| exp <= now.timestamp())
        .unwrap_or(false)
}

fn check_credentials(email: &str, password: &str) -> ClientResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ClientError::validation("a valid email is required"));
    }
    if password.is_empty() {
        return Err(ClientError::validation("password is required"));
    }
    Ok(())
}

/// Exchange email/password for a token and store it in the session.
pub async fn sign_in<A>(api: &A, session: &dyn SessionStore, email: &str, password: &str) -> ClientResult<()>
where
    A: LostFoundApi + ?Sized,
{
    check_credentials(email, password)?;
    let token = api
        .sign_in(&SignInRequest { email: email.trim().to_string(), password: password.to_string() })
        .await?;
    session.set(Credential::new(token))?;
    info!(email = email.trim(), "signed in");
    Ok(())
}

pub async fn sign_up<A>(
    api: &A,
    session: &dyn SessionStore,
    email: &str,
    password: &str,
    phone: Option<&str>,
) -> ClientResult<()>
where
    A: LostFoundApi + ?Sized,
{
    check_credentials(email, password)?;
    let phone = phone.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
    let token = api
        .sign_up(&SignUpRequest { email: email.trim().to_string(), password: password.to_string(), phone })
        .await?;
    session.set(Credential::new(token))?;
    info!(email = email.trim(), "account created");
    Ok(())
}

pub fn sign_out(session: &dyn SessionStore) -> ClientResult<()> {
    session.clear()?;
    info!("signed out");
    Ok(())
}
