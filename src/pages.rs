//! Page routing and per-page presentation
//!
//! Every view is a pure function of the two presentation flags and the
//! route; nothing here reads the viewport width directly.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The two flags every view renders from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub is_dark: bool,
    pub is_mobile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    About,
    Projects,
    Contact,
}

impl Route {
    /// Navigation order
    pub const ALL: [Route; 4] = [Route::Home, Route::About, Route::Projects, Route::Contact];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Projects => "/projects",
            Route::Contact => "/contact",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::About => "About",
            Route::Projects => "Projects",
            Route::Contact => "Contact",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::About => "about",
            Route::Projects => "projects",
            Route::Contact => "contact",
        }
    }

    /// Match a browser path, ignoring one trailing slash
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(rest) => rest,
        };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|route| route.slug() == s)
            .ok_or_else(|| format!("unknown page: {}", s))
    }
}

/// Decorative scene shown on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneAsset {
    /// Interactive 3D viewer loading a model
    Interactive { model: String },
    /// Procedurally generated 3D shapes, no asset to fetch
    Procedural,
    /// Static image standing in for the 3D viewer
    Static { image: String },
    None,
}

impl SceneAsset {
    pub fn interactive(model: &str) -> Self {
        SceneAsset::Interactive {
            model: model.to_string(),
        }
    }

    pub fn still(image: &str) -> Self {
        SceneAsset::Static {
            image: image.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub route: Route,
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub route: Route,
    pub title: String,
    pub path: String,
    /// Class applied to the root element for CSS scoping
    pub theme_class: String,
    pub is_mobile: bool,
    pub scene: SceneAsset,
}

pub fn navigation() -> Vec<NavEntry> {
    Route::ALL
        .into_iter()
        .map(|route| NavEntry {
            route,
            title: route.title().to_string(),
            path: route.path().to_string(),
        })
        .collect()
}

/// Desktop gets the 3D viewer, mobile a static fallback or nothing
pub fn scene_for(route: Route, is_mobile: bool) -> SceneAsset {
    match (route, is_mobile) {
        (Route::Home, false) => SceneAsset::interactive("/models/pc.glb"),
        (Route::Home, true) => SceneAsset::still("/models/pc.png"),
        (Route::About, false) => SceneAsset::interactive("/models/about.glb"),
        (Route::About, true) => SceneAsset::still("/images/image.jpg"),
        (Route::Contact, false) => SceneAsset::Procedural,
        (Route::Contact, true) | (Route::Projects, _) => SceneAsset::None,
    }
}

pub fn render_page(route: Route, presentation: Presentation) -> PageView {
    let theme_class = if presentation.is_dark { "dark" } else { "light" };
    PageView {
        route,
        title: route.title().to_string(),
        path: route.path().to_string(),
        theme_class: theme_class.to_string(),
        is_mobile: presentation.is_mobile,
        scene: scene_for(route, presentation.is_mobile),
    }
}
