//! Console routes, mirroring the web console's paths.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/dashboard/clientes`
    Clientes,
    /// `/dashboard/clientes/:id/pipelines`
    Pipelines { cliente_id: i64 },
    /// `/dashboard/tintim`
    Tintim,
    /// `/dashboard/tintim/monitoramento/:id?`
    TintimMonitoring { id: Option<i64> },
    /// `/dashboard/portais`
    Portais,
    /// `/dashboard/portais/monitoramento/:id?`
    PortaisMonitoring { id: Option<i64> },
    /// `/dashboard/contas`
    Contas,
}

impl Route {
    /// Parse a path; trailing slashes and a query string are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", "clientes"] => Route::Clientes,
            ["dashboard", "clientes", id, "pipelines"] => Route::Pipelines {
                cliente_id: id.parse().ok()?,
            },
            ["dashboard", "tintim"] => Route::Tintim,
            ["dashboard", "tintim", "monitoramento"] => Route::TintimMonitoring { id: None },
            ["dashboard", "tintim", "monitoramento", id] => Route::TintimMonitoring {
                id: Some(id.parse().ok()?),
            },
            ["dashboard", "portais"] => Route::Portais,
            ["dashboard", "portais", "monitoramento"] => Route::PortaisMonitoring { id: None },
            ["dashboard", "portais", "monitoramento", id] => Route::PortaisMonitoring {
                id: Some(id.parse().ok()?),
            },
            ["dashboard", "contas"] => Route::Contas,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Clientes => "/dashboard/clientes".to_string(),
            Route::Pipelines { cliente_id } => format!("/dashboard/clientes/{cliente_id}/pipelines"),
            Route::Tintim => "/dashboard/tintim".to_string(),
            Route::TintimMonitoring { id: None } => "/dashboard/tintim/monitoramento".to_string(),
            Route::TintimMonitoring { id: Some(id) } => format!("/dashboard/tintim/monitoramento/{id}"),
            Route::Portais => "/dashboard/portais".to_string(),
            Route::PortaisMonitoring { id: None } => "/dashboard/portais/monitoramento".to_string(),
            Route::PortaisMonitoring { id: Some(id) } => format!("/dashboard/portais/monitoramento/{id}"),
            Route::Contas => "/dashboard/contas".to_string(),
        }
    }

    /// Page title shown in the header bar.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Clientes => "Clientes",
            Route::Pipelines { .. } => "Pipelines",
            Route::Tintim => "TinTim",
            Route::TintimMonitoring { .. } => "Monitoramento TinTim",
            Route::Portais => "Portais",
            Route::PortaisMonitoring { .. } => "Monitoramento Portais",
            Route::Contas => "Gerenciamento de Contas",
        }
    }

    /// Whether the route needs an authenticated session.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Sidebar entries, in display order.
    pub fn menu() -> [Route; 6] {
        [
            Route::Clientes,
            Route::Tintim,
            Route::TintimMonitoring { id: None },
            Route::Portais,
            Route::PortaisMonitoring { id: None },
            Route::Contas,
        ]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_path_back() {
        let routes = [
            Route::Login,
            Route::Dashboard,
            Route::Clientes,
            Route::Pipelines { cliente_id: 7 },
            Route::Tintim,
            Route::TintimMonitoring { id: None },
            Route::TintimMonitoring { id: Some(3) },
            Route::Portais,
            Route::PortaisMonitoring { id: None },
            Route::PortaisMonitoring { id: Some(12) },
            Route::Contas,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route.clone()), "{route}");
        }
    }

    #[test]
    fn tolerates_trailing_slash_and_query() {
        assert_eq!(Route::parse("/dashboard/clientes/"), Some(Route::Clientes));
        assert_eq!(Route::parse("/dashboard/tintim?x=1"), Some(Route::Tintim));
    }

    #[test]
    fn rejects_unknown_and_bad_ids() {
        assert_eq!(Route::parse("/dashboard/nada"), None);
        assert_eq!(Route::parse("/dashboard/clientes/abc/pipelines"), None);
    }

    #[test]
    fn paths_need_the_dashboard_prefix() {
        assert_eq!(Route::parse("/clientes"), None);
        assert_eq!(Route::parse("/tintim/monitoramento/12"), None);
        assert_eq!(
            Route::parse("/dashboard/tintim/monitoramento/12"),
            Some(Route::TintimMonitoring { id: Some(12) })
        );
    }

    #[test]
    fn only_login_is_public() {
        assert!(!Route::Login.requires_auth());
        assert!(Route::Contas.requires_auth());
    }
}
