use crate::auth::jwt::verify_access_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::timekeeping::filter::UserSelection;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_access_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return ready(Err(ErrorUnauthorized("Invalid token")));
            }
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            username: claims.sub,
            role,
        }))
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// Narrow a requested user selection to what this caller may see.
    ///
    /// Employees always get their own timeline; asking for someone else
    /// is refused rather than silently rewritten.
    pub fn visible_selection(&self, requested: UserSelection) -> actix_web::Result<UserSelection> {
        if self.role.sees_everyone() {
            return Ok(requested);
        }
        match requested {
            UserSelection::User(name) if name != self.username => Err(
                actix_web::error::ErrorForbidden("Employees can only view their own attendance"),
            ),
            _ => Ok(UserSelection::User(self.username.clone())),
        }
    }
}
