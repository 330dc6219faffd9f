//! Organism registry and dispatch.
//!
//! # Responsibilities
//! - Compile one view per (organism, page kind) from config
//! - Look up the view whose pathname matches a URL
//! - Delegate parsing and serialization to that view
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) pathname scan (a few dozen views at most)
//! - Explicit `None` on no match rather than a silent default
//! - Pathname uniqueness is checked by config validation, not here

use std::sync::Arc;

use url::Url;

use crate::config::OrganismConfig;
use crate::routing::matcher::PathMatcher;
use crate::views::{Route, View, ViewKind};

/// Base for resolving relative dashboard URLs such as `/covid/single-variant?date=allTimes`.
const RELATIVE_URL_BASE: &str = "http://dashboard.invalid/";

/// A view with its compiled pathname matcher.
#[derive(Debug, Clone)]
struct CompiledView {
    matcher: PathMatcher,
    view: View,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    organisms: Vec<Arc<OrganismConfig>>,
    views: Vec<CompiledView>,
}

impl Registry {
    /// Build the registry from organism configs, preserving config order.
    pub fn from_config(organisms: &[OrganismConfig]) -> Self {
        let organisms: Vec<Arc<OrganismConfig>> =
            organisms.iter().cloned().map(Arc::new).collect();

        let views = organisms
            .iter()
            .flat_map(|organism| {
                organism.views.iter().map(move |kind| {
                    let view = View::new(organism.clone(), *kind);
                    CompiledView {
                        matcher: PathMatcher::new(view.pathname()),
                        view,
                    }
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            organisms = organisms.len(),
            views = views.len(),
            "Compiled view registry"
        );

        Self { organisms, views }
    }

    pub fn organisms(&self) -> impl Iterator<Item = &OrganismConfig> {
        self.organisms.iter().map(|o| o.as_ref())
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter().map(|c| &c.view)
    }

    /// Views of one organism in config order.
    pub fn views_of<'a>(&'a self, organism: &'a str) -> impl Iterator<Item = &'a View> + 'a {
        self.views().filter(move |v| v.organism().key == organism)
    }

    pub fn find_view(&self, organism: &str, kind: ViewKind) -> Option<&View> {
        self.views()
            .find(|v| v.organism().key == organism && v.kind() == kind)
    }

    /// The view a route was parsed by.
    pub fn view_for(&self, route: &Route) -> Option<&View> {
        self.find_view(&route.organism, route.kind())
    }

    /// Look up the view owning a pathname.
    pub fn match_path(&self, pathname: &str) -> Option<&View> {
        self.views
            .iter()
            .find(|c| c.matcher.matches(pathname))
            .map(|c| &c.view)
    }

    pub fn match_url(&self, url: &Url) -> Option<&View> {
        self.match_path(url.path())
    }

    /// Find the matching view and parse the URL with it.
    ///
    /// `None` when no view matches or the query is rejected.
    pub fn parse_url(&self, url: &Url) -> Option<Route> {
        let Some(view) = self.match_url(url) else {
            tracing::debug!(path = %url.path(), "No view matched");
            return None;
        };
        view.parse_url(url)
    }

    /// Like [`Registry::parse_url`], accepting absolute or root-relative URLs.
    pub fn parse_str(&self, url: &str) -> Option<Route> {
        resolve_url(url).ok().and_then(|url| self.parse_url(&url))
    }

    /// Canonical URL of a route, or `None` if its view is not registered.
    pub fn to_url(&self, route: &Route) -> Option<String> {
        self.view_for(route).and_then(|view| view.to_url(route))
    }

    pub fn default_route(&self, organism: &str, kind: ViewKind) -> Option<Route> {
        self.find_view(organism, kind).map(View::default_route)
    }
}

/// Parse an absolute URL, or a relative one against a placeholder origin.
pub fn resolve_url(input: &str) -> Result<Url, url::ParseError> {
    match Url::parse(input) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_URL_BASE)?.join(input),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::builtin_organisms;
    use crate::views::RouteData;

    fn registry() -> Registry {
        Registry::from_config(&builtin_organisms())
    }

    #[test]
    fn test_one_view_per_organism_and_kind() {
        let registry = registry();
        assert_eq!(registry.views().count(), 6 * ViewKind::ALL.len());
        assert_eq!(registry.views_of("mpox").count(), ViewKind::ALL.len());
    }

    #[test]
    fn test_dispatch_by_pathname() {
        let registry = registry();

        let view = registry.match_path("/rsv-a/sequencing-efforts/").unwrap();
        assert_eq!(view.organism().key, "rsv-a");
        assert_eq!(view.kind(), ViewKind::SequencingEfforts);

        assert!(registry.match_path("/rsv-c/sequencing-efforts").is_none());
        assert!(registry.match_path("/").is_none());
    }

    #[test]
    fn test_parse_str_relative_and_absolute() {
        let registry = registry();

        let relative = registry.parse_str("/covid/single-variant?country=France").unwrap();
        let absolute = registry
            .parse_str("https://genspectrum.org/covid/single-variant?country=France")
            .unwrap();
        assert_eq!(relative, absolute);
        assert_eq!(relative.organism, "covid");

        assert!(registry.parse_str("/covid/unknown-page").is_none());
        assert!(registry.parse_str("/covid/single-variant?date=someday").is_none());
    }

    #[test]
    fn test_default_route_and_to_url() {
        let registry = registry();
        let route = registry
            .default_route("west-nile", ViewKind::SingleVariant)
            .unwrap();
        assert!(matches!(route.data, RouteData::SingleVariant { .. }));
        assert_eq!(
            registry.to_url(&route).as_deref(),
            Some("/west-nile/single-variant")
        );
        assert!(registry.default_route("dengue", ViewKind::SingleVariant).is_none());
    }

    #[test]
    fn test_restricted_views() {
        let mut organisms = builtin_organisms();
        organisms[0].views = vec![ViewKind::SingleVariant];
        let registry = Registry::from_config(&organisms);

        assert!(registry.match_path("/covid/single-variant").is_some());
        assert!(registry.match_path("/covid/compare-variants").is_none());
        assert!(registry.find_view("covid", ViewKind::CompareVariants).is_none());
    }
}
