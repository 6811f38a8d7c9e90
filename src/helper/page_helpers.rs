use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ApiError;
use crate::models::enums::Badge;

/// Chrome wrapped around a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Header and footer of the public site.
    Public,
    /// Sidebar of the back office.
    Admin,
}

impl Layout {
    fn template(&self) -> &'static str {
        match self {
            Layout::Public => "layouts/public.html",
            Layout::Admin => "layouts/admin.html",
        }
    }
}

pub fn layout_for_path(path: &str) -> Layout {
    if path == "/admin" || path.starts_with("/admin/") {
        Layout::Admin
    } else {
        Layout::Public
    }
}

/// Loads every template shipped with the crate.
pub fn load_templates() -> Result<Tera, tera::Error> {
    Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html"))
}

/// Renders `page` and places it inside the layout chosen for `path`.
pub fn render_page(tera: &Tera, path: &str, page: &str, mut ctx: Context) -> Result<String, ApiError> {
    let content = tera.render(page, &ctx)?;
    ctx.insert("content", &content);
    ctx.insert("current_path", path);
    Ok(tera.render(layout_for_path(path).template(), &ctx)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeView {
    pub label: &'static str,
    pub class: &'static str,
}

impl BadgeView {
    pub fn of<B: Badge>(value: &B) -> Self {
        BadgeView {
            label: value.label(),
            class: value.color().css_class(),
        }
    }
}

/// A record plus the badge shown next to it.
#[derive(Debug, Serialize)]
pub struct Row<'a, T: Serialize> {
    #[serde(flatten)]
    pub record: &'a T,
    pub badge: BadgeView,
}
