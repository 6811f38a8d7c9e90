use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::error::ApiError;
use crate::helper::listing_helpers::{search, ApplicationSort, MemberSort, MessageSort};
use crate::helper::member_helpers::MemberFilter;
use crate::helper::page_helpers::{render_page, BadgeView, Row};
use crate::helper::record_helpers::{self, with_conn};
use crate::middleware::AdminAccess;
use crate::models::community::{ContactMessage, Event, NewsArticle, NewsFilter, StatusFilter};
use crate::models::db_operations::records_db_operations;
use crate::models::enums::{
    ApplicationStatus, EventStatus, MemberStatus, MembershipType, MessageStatus, NewsStatus, Zone,
};
use crate::models::{ColumnSet, Member, MembershipApplication};
use crate::DbPool;

const HOME_ITEMS: usize = 3;

pub fn config_pages(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/about", web::get().to(about))
        .route("/services", web::get().to(services))
        .route("/admin", web::get().to(dashboard))
        .route("/admin/applications", web::get().to(applications))
        .route("/admin/members", web::get().to(members))
        .route("/admin/messages", web::get().to(messages));
}

#[derive(Debug, Deserialize)]
pub struct ListQuery<S> {
    q: Option<String>,
    sort: Option<String>,
    status: Option<S>,
}

#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    q: Option<String>,
    sort: Option<String>,
    status: Option<MemberStatus>,
    zone: Option<Zone>,
    membership_type: Option<MembershipType>,
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

async fn home(req: HttpRequest, tera: web::Data<Tera>, pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let events: Vec<Event> = record_helpers::list(
        &pool,
        StatusFilter {
            status: Some(EventStatus::Upcoming),
        },
    )
    .await?;
    let news: Vec<NewsArticle> = record_helpers::list(
        &pool,
        NewsFilter {
            status: Some(NewsStatus::Published),
            category: None,
        },
    )
    .await?;

    let mut ctx = Context::new();
    ctx.insert("events", &events.iter().take(HOME_ITEMS).collect::<Vec<_>>());
    ctx.insert("news", &news.iter().take(HOME_ITEMS).collect::<Vec<_>>());
    Ok(html(render_page(&tera, req.path(), "pages/home.html", ctx)?))
}

async fn about(req: HttpRequest, tera: web::Data<Tera>) -> Result<HttpResponse, ApiError> {
    Ok(html(render_page(&tera, req.path(), "pages/about.html", Context::new())?))
}

async fn services(req: HttpRequest, tera: web::Data<Tera>) -> Result<HttpResponse, ApiError> {
    Ok(html(render_page(&tera, req.path(), "pages/services.html", Context::new())?))
}

async fn dashboard(
    _admin: AdminAccess,
    req: HttpRequest,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let (pending, active, unread) = with_conn(&pool, |conn| {
        let mut pending = ColumnSet::new();
        pending.set("status", ApplicationStatus::Pending);
        let mut active = ColumnSet::new();
        active.set("status", MemberStatus::Active);
        let mut unread = ColumnSet::new();
        unread.set("status", MessageStatus::New);

        Ok((
            records_db_operations::count_records::<MembershipApplication>(conn, &pending.into_columns())?,
            records_db_operations::count_records::<Member>(conn, &active.into_columns())?,
            records_db_operations::count_records::<ContactMessage>(conn, &unread.into_columns())?,
        ))
    })
    .await?;

    let mut ctx = Context::new();
    ctx.insert("pending_applications", &pending);
    ctx.insert("active_members", &active);
    ctx.insert("new_messages", &unread);
    Ok(html(render_page(&tera, req.path(), "admin/dashboard.html", ctx)?))
}

fn list_context(q: &Option<String>, sort: &str, sort_keys: &[&str], total: usize) -> Context {
    let mut ctx = Context::new();
    ctx.insert("q", q.as_deref().unwrap_or_default());
    ctx.insert("sort", sort);
    ctx.insert("sort_keys", sort_keys);
    ctx.insert("total", &total);
    ctx
}

async fn applications(
    _admin: AdminAccess,
    req: HttpRequest,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery<ApplicationStatus>>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let mut filter = ColumnSet::new();
    filter.patch("status", query.status);
    let filters = filter.into_columns();

    let fetched: Vec<MembershipApplication> = with_conn(&pool, move |conn| {
        Ok(records_db_operations::list_records(conn, &filters)?)
    })
    .await?;
    let total = fetched.len();
    let mut found = search(fetched, query.q.as_deref());
    let sort = ApplicationSort::parse(query.sort.as_deref());
    sort.apply(&mut found);

    let rows: Vec<Row<'_, MembershipApplication>> = found
        .iter()
        .map(|a| Row {
            record: a,
            badge: BadgeView::of(&a.status),
        })
        .collect();
    let mut ctx = list_context(&query.q, query.sort.as_deref().unwrap_or("newest"), ApplicationSort::KEYS, total);
    ctx.insert("rows", &rows);
    ctx.insert("status", &query.status);
    ctx.insert("statuses", ApplicationStatus::ALL);
    Ok(html(render_page(&tera, req.path(), "admin/applications.html", ctx)?))
}

async fn members(
    _admin: AdminAccess,
    req: HttpRequest,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
    query: web::Query<MemberListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filters = MemberFilter {
        status: query.status,
        zone: query.zone,
        membership_type: query.membership_type,
    }
    .into_columns();

    let fetched: Vec<Member> = with_conn(&pool, move |conn| {
        Ok(records_db_operations::list_records(conn, &filters)?)
    })
    .await?;
    let total = fetched.len();
    let mut found = search(fetched, query.q.as_deref());
    MemberSort::parse(query.sort.as_deref()).apply(&mut found);

    let rows: Vec<Row<'_, Member>> = found
        .iter()
        .map(|m| Row {
            record: m,
            badge: BadgeView::of(&m.status),
        })
        .collect();
    let mut ctx = list_context(&query.q, query.sort.as_deref().unwrap_or("newest"), MemberSort::KEYS, total);
    ctx.insert("rows", &rows);
    ctx.insert("status", &query.status);
    ctx.insert("zone", &query.zone);
    ctx.insert("statuses", MemberStatus::ALL);
    ctx.insert("zones", Zone::ALL);
    Ok(html(render_page(&tera, req.path(), "admin/members.html", ctx)?))
}

async fn messages(
    _admin: AdminAccess,
    req: HttpRequest,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery<MessageStatus>>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let fetched: Vec<ContactMessage> = record_helpers::list(&pool, StatusFilter { status: query.status }).await?;
    let total = fetched.len();
    let mut found = search(fetched, query.q.as_deref());
    MessageSort::parse(query.sort.as_deref()).apply(&mut found);

    let rows: Vec<Row<'_, ContactMessage>> = found
        .iter()
        .map(|m| Row {
            record: m,
            badge: BadgeView::of(&m.status),
        })
        .collect();
    let mut ctx = list_context(&query.q, query.sort.as_deref().unwrap_or("newest"), MessageSort::KEYS, total);
    ctx.insert("rows", &rows);
    ctx.insert("status", &query.status);
    ctx.insert("statuses", MessageStatus::ALL);
    Ok(html(render_page(&tera, req.path(), "admin/messages.html", ctx)?))
}
