//! Navigation surface: the screens the application exposes and the access
//! level each one needs.

use serde::{Deserialize, Serialize};

/// Query parameter carrying the originally requested path
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Screen reachable by path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    Catalog,
    AddItem,
    Dashboard,
    Admin,
    Login,
    Register,
    ProductDetail(String),
    Profile,
}

/// Access requirement of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    /// Resolve a path. Query strings and trailing slashes are ignored;
    /// unknown paths fall back to `Home`.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["products"] => Route::Catalog,
            ["add-product"] => Route::AddItem,
            ["dashboard"] => Route::Dashboard,
            ["admin"] => Route::Admin,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["product", id] => Route::ProductDetail((*id).to_string()),
            ["profile"] => Route::Profile,
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Catalog => "/products".to_string(),
            Route::AddItem => "/add-product".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ProductDetail(id) => format!("/product/{}", id),
            Route::Profile => "/profile".to_string(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::AddItem | Route::Dashboard | Route::Profile => Access::Authenticated,
            Route::Admin => Access::Admin,
            _ => Access::Public,
        }
    }

    /// Page title shown for the route
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Catalog => "Products",
            Route::AddItem => "Add Product",
            Route::Dashboard => "Dashboard",
            Route::Admin => "Admin Panel",
            Route::Login => "Sign In",
            Route::Register => "Sign Up",
            Route::ProductDetail(_) => "Product Detail",
            Route::Profile => "My Profile",
        }
    }
}

/// Where navigation should land, with an optional return path for the
/// login screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub route: Route,
    pub return_url: Option<String>,
}

impl NavigationTarget {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            return_url: None,
        }
    }

    /// Login screen that sends the user back to `requested` afterwards
    pub fn login_returning_to(requested: impl Into<String>) -> Self {
        Self {
            route: Route::Login,
            return_url: Some(requested.into()),
        }
    }

    /// Path plus the percent-encoded return path
    pub fn url(&self) -> String {
        match &self.return_url {
            Some(back) => format!(
                "{}?{}={}",
                self.route.path(),
                RETURN_URL_PARAM,
                urlencoding::encode(back)
            ),
            None => self.route.path(),
        }
    }

    /// Inverse of `url`. A return path that is not valid percent-encoding
    /// is dropped.
    pub fn parse(url: &str) -> Self {
        let route = Route::parse(url);
        let query = url
            .split_once('?')
            .map(|(_, query)| query.split('#').next().unwrap_or_default())
            .unwrap_or_default();

        let return_url = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == RETURN_URL_PARAM)
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .map(|value| value.into_owned())
            .filter(|value| !value.is_empty());

        Self { route, return_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/products"), Route::Catalog);
        assert_eq!(Route::parse("/admin/"), Route::Admin);
        assert_eq!(Route::parse("/login?returnUrl=/admin"), Route::Login);
        assert_eq!(Route::parse("/product/42"), Route::ProductDetail("42".to_string()));
    }

    #[test]
    fn test_unknown_paths_fall_back_home() {
        assert_eq!(Route::parse("/nowhere"), Route::Home);
        assert_eq!(Route::parse("/product"), Route::Home);
        assert_eq!(Route::parse("/product/1/edit"), Route::Home);
    }

    #[test]
    fn test_parse_path_round_trip_for_detail() {
        let route = Route::ProductDetail("abc".to_string());
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_access_levels() {
        assert_eq!(Route::Admin.access(), Access::Admin);
        assert_eq!(Route::Profile.access(), Access::Authenticated);
        assert_eq!(Route::ProductDetail("1".into()).access(), Access::Public);
    }

    #[test]
    fn test_login_target_url() {
        let target = NavigationTarget::login_returning_to("/dashboard");
        assert_eq!(target.url(), "/login?returnUrl=%2Fdashboard");
        assert_eq!(NavigationTarget::to(Route::Home).url(), "/");
    }

    #[test]
    fn test_return_url_with_query_survives() {
        let target = NavigationTarget::login_returning_to("/product/7?tab=photos&zoom=2");
        let url = target.url();
        assert!(!url[url.find('?').unwrap() + 1..].contains('&'));

        let parsed = NavigationTarget::parse(&url);
        assert_eq!(parsed, target);
        assert_eq!(
            Route::parse(parsed.return_url.as_deref().unwrap()),
            Route::ProductDetail("7".to_string())
        );
    }

    #[test]
    fn test_parse_without_return_url() {
        assert_eq!(
            NavigationTarget::parse("/products?sort=newest"),
            NavigationTarget::to(Route::Catalog)
        );
        assert_eq!(
            NavigationTarget::parse("/login?returnUrl=%FF"),
            NavigationTarget::to(Route::Login)
        );
    }
}
