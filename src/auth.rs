use async_trait::async_trait;
use pgwire::api::auth::{AuthSource, LoginInfo, Password};
use pgwire::error::PgWireResult;

/// One shared password for every staff login. The user name is ignored;
/// the shop is chosen by the database name instead.
#[derive(Debug)]
pub struct SalonAuthSource {
    password: String,
}

impl SalonAuthSource {
    pub fn new(password: String) -> Self {
        Self { password }
    }
}

#[async_trait]
impl AuthSource for SalonAuthSource {
    async fn get_password(&self, login: &LoginInfo) -> PgWireResult<Password> {
        tracing::debug!(?login, "login attempt");
        Ok(Password::new(None, self.password.as_bytes().to_vec()))
    }
}
