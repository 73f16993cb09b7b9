//! HTTP server for the blog

mod error;
pub mod views;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::AuthGuard;
use crate::authoring::{ImageUpload, PublishRequest, Publisher};
use crate::config::SiteConfig;
use crate::content::MarkdownRenderer;
use crate::helpers::url_for;
use crate::posts::PostService;
use crate::Blog;

pub use error::{ServerError, ServerResult};
use views::{AdminView, AuthView, IndexView, PostSummary, PostView, SiteView};

/// Largest accepted authoring request, image included
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared by every request
pub struct AppState {
    pub config: SiteConfig,
    pub posts: PostService,
    pub guard: Arc<AuthGuard>,
    pub publisher: Arc<Publisher>,
    pub renderer: MarkdownRenderer,
}

impl AppState {
    pub fn new(blog: &Blog) -> Self {
        Self {
            config: blog.config.clone(),
            posts: blog.posts.clone(),
            guard: blog.guard.clone(),
            publisher: blog.publisher.clone(),
            renderer: blog.renderer(),
        }
    }
}

/// Build the application routes
pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/posts", post(create_post))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(index))
        .route("/post/:param", get(show_post))
        .route("/login", get(auth_status).post(login))
        .route("/logout", post(logout))
        .merge(admin)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(blog));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if !blog.config.backend.is_configured() {
        println!("No backend configured; serving bundled posts only.");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Send anonymous visitors of `/admin` routes to the login page
async fn require_login(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    match state.guard.require_session().await {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::debug!("Anonymous request to {}, redirecting", request.uri().path());
            Redirect::to(&url_for(&state.config, "login")).into_response()
        }
    }
}

async fn index(State(state): State<Arc<AppState>>) -> ServerResult<Json<IndexView>> {
    let listing = state.posts.list_posts().await?;
    Ok(Json(IndexView::new(&state.config, &listing)))
}

async fn show_post(
    State(state): State<Arc<AppState>>,
    Path(param): Path<String>,
) -> ServerResult<Json<PostView>> {
    // The router percent-decodes the segment; nothing else is normalized
    let post = state
        .posts
        .resolve(&param)
        .await?
        .ok_or(ServerError::NotFound)?;

    // The sidebar is optional; a failing listing must not hide the post
    let all = match state.posts.all_posts().await {
        Ok(all) => all,
        Err(e) => {
            tracing::warn!("Sidebar unavailable: {}", e);
            vec![post.clone()]
        }
    };

    Ok(Json(PostView::new(
        &state.config,
        &state.renderer,
        &post,
        &all,
    )))
}

async fn admin_page(State(state): State<Arc<AppState>>) -> ServerResult<Json<AdminView>> {
    let session = state
        .guard
        .require_session()
        .await
        .map_err(ServerError::Unauthorized)?;

    Ok(Json(AdminView {
        site: SiteView::new(&state.config),
        user_id: session.user_id,
        email: session.email,
        action: url_for(&state.config, "admin/posts"),
        fields: ["title", "content", "image"],
    }))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ServerResult<Response> {
    let request = read_publish_form(&mut multipart).await?;
    let post = state.publisher.publish(request).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, url_for(&state.config, "/"))],
        Json(PostSummary::new(&state.config, &post)),
    )
        .into_response())
}

/// Collect the `title`, `content` and `image` fields of the authoring form
async fn read_publish_form(multipart: &mut Multipart) -> ServerResult<PublishRequest> {
    let mut request = PublishRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                request.title = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?
            }
            "content" => {
                request.content = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;

                // Browsers send an empty, nameless part when no file was chosen
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                request.image = Some(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(request)
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> ServerResult<StatusCode> {
    state
        .guard
        .login(&form.email, &form.password)
        .await
        .map_err(ServerError::Unauthorized)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.guard.logout().await;
    StatusCode::NO_CONTENT
}

async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthView> {
    let current = state.guard.current().await;
    let session = current.session();

    Json(AuthView {
        authenticated: session.is_some(),
        user_id: session.map(|s| s.user_id.clone()),
        email: session.and_then(|s| s.email.clone()),
    })
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
