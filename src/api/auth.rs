use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route,
};

use crate::model::{
    auth::{AuthToken, AUTH_TOKEN_COOKIE},
    principal::Principal,
};

pub fn routes() -> Vec<Route> {
    routes![whoami, logout]
}

/// The principal the caller's token was issued to.
#[get("/auth")]
fn whoami(token: AuthToken) -> Json<Principal> {
    Json(token.principal().clone())
}

#[delete("/auth")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;
    use crate::api::test_util::login;
    use crate::config::Config;

    #[backend_test]
    async fn whoami_reports_principal(client: Client) {
        let response = client
            .get("/auth")
            .cookie(login(&client, "alice"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_json::<Principal>().await,
            Some(Principal::voter("alice"))
        );
    }

    #[backend_test]
    async fn missing_or_forged_token_is_unauthorized(client: Client) {
        let response = client.get("/auth").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let forged = AuthToken::new(Principal::admin())
            .into_cookie(&Config::with_secret("not-the-server-secret"))
            .unwrap();
        let response = client.get("/auth").cookie(forged).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[backend_test]
    async fn logout_clears_cookie(client: Client) {
        let response = client
            .delete("/auth")
            .cookie(login(&client, "alice"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let set_cookie = response.headers().get_one("Set-Cookie").unwrap();
        assert!(set_cookie.starts_with(&format!("{AUTH_TOKEN_COOKIE}=;")));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
