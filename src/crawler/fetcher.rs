//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building an HTTP client with a cookie store and user agent
//! - GET requests for pages and binary archives
//! - Logging in to private archives through the Mailman login form
//!
//! There is no retry logic: any network failure or non-success status is
//! returned to the caller, which aborts the run.

use crate::MirrorError;
use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Response};
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

fn client_builder(user_agent: &str, cookies: Arc<Jar>) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .cookie_provider(cookies)
}

/// Builds an HTTP client with proper configuration
///
/// The cookie jar keeps the session established by [`PageFetcher::login`]
/// for every later request.
///
/// # Example
///
/// ```no_run
/// use mailman_mirror::crawler::build_http_client;
/// use reqwest::cookie::Jar;
/// use std::sync::Arc;
///
/// let client = build_http_client("mailman-mirror/1.2", Arc::new(Jar::default())).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, cookies: Arc<Jar>) -> Result<Client, reqwest::Error> {
    client_builder(user_agent, cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds a client that returns response bodies exactly as sent
///
/// Text archives are often served with `Content-Encoding: gzip`, and must be
/// saved still compressed.
pub fn build_raw_client(user_agent: &str, cookies: Arc<Jar>) -> Result<Client, reqwest::Error> {
    client_builder(user_agent, cookies)
        .no_gzip()
        .no_brotli()
        .build()
}

/// Fetches archive pages over one HTTP session
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,

    /// Shares the session cookies, but never decodes bodies
    raw_client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str) -> Result<Self, MirrorError> {
        let cookies = Arc::new(Jar::default());
        Ok(Self {
            client: build_http_client(user_agent, Arc::clone(&cookies))?,
            raw_client: build_raw_client(user_agent, cookies)?,
        })
    }

    /// Fetches a page as text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The page body
    /// * `Err(MirrorError::Fetch)` - Network failure
    /// * `Err(MirrorError::HttpStatus)` - The server answered with a non-success status
    pub async fn fetch_text(&self, url: &str) -> Result<String, MirrorError> {
        let response = get(&self.client, url).await?;
        response.text().await.map_err(|source| MirrorError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches a resource as raw bytes, e.g. a `.txt.gz` archive
    ///
    /// The body is returned undecoded whatever its `Content-Encoding`.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let response = get(&self.raw_client, url).await?;
        let bytes = response.bytes().await.map_err(|source| MirrorError::Fetch {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Logs in to a private archive
    ///
    /// Fetches `list_url`, fills in the first form that has a password field
    /// and submits it. The session cookie is kept by the client.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The archive no longer asks for a password
    /// * `Err(MirrorError::Auth)` - No login form, or the credentials were rejected
    pub async fn login(
        &self,
        list_url: &str,
        username: &str,
        password: &str,
    ) -> Result<(), MirrorError> {
        tracing::info!("Logging in to {}", list_url);

        let page_url = Url::parse(list_url)?;
        let login_page = self.fetch_text(list_url).await?;

        let form = LoginForm::find(&login_page, &page_url).ok_or_else(|| MirrorError::Auth {
            url: list_url.to_string(),
            reason: "no login form found".to_string(),
        })?;
        let fields = form.fields_with(username, password);

        tracing::debug!("Submitting login form to {}", form.action);
        let response = self
            .client
            .post(form.action.clone())
            .form(&fields)
            .send()
            .await
            .map_err(|source| MirrorError::Fetch {
                url: form.action.to_string(),
                source,
            })?;
        let response = check_status(form.action.as_str(), response)?;
        let body = response.text().await.map_err(|source| MirrorError::Fetch {
            url: form.action.to_string(),
            source,
        })?;

        if LoginForm::find(&body, &form.action).is_some() {
            return Err(MirrorError::Auth {
                url: list_url.to_string(),
                reason: "credentials rejected".to_string(),
            });
        }

        tracing::info!("Logged in as {}", username);
        Ok(())
    }
}

async fn get(client: &Client, url: &str) -> Result<Response, MirrorError> {
    tracing::debug!("Fetching {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| MirrorError::Fetch {
            url: url.to_string(),
            source,
        })?;

    check_status(url, response)
}

fn check_status(url: &str, response: Response) -> Result<Response, MirrorError> {
    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// A login form located on a page
#[derive(Debug, Clone, PartialEq)]
struct LoginForm {
    /// Absolute URL the form posts to
    action: Url,

    /// Name of the password input
    password_field: String,

    /// Hidden, submit and other pre-filled fields, in document order
    fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Finds the first form on a page that contains a password input
    fn find(html: &str, page_url: &Url) -> Option<Self> {
        let document = Html::parse_document(html);
        let form_selector = Selector::parse("form").ok()?;

        document
            .select(&form_selector)
            .find_map(|form| Self::from_element(form, page_url))
    }

    fn from_element(form: ElementRef<'_>, page_url: &Url) -> Option<Self> {
        let input_selector = Selector::parse("input[name]").ok()?;

        let mut password_field = None;
        let mut fields = Vec::new();
        let mut submit_seen = false;

        for input in form.select(&input_selector) {
            let element = input.value();
            let name = element.attr("name").unwrap_or_default().to_string();
            let value = element.attr("value").unwrap_or_default().to_string();
            let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();

            match kind.as_str() {
                "password" => {
                    password_field.get_or_insert(name);
                }
                "checkbox" | "radio" => {
                    if element.attr("checked").is_some() {
                        fields.push((name, value));
                    }
                }
                // Only the button that gets "clicked" is sent
                "submit" | "image" => {
                    if !submit_seen {
                        submit_seen = true;
                        fields.push((name, value));
                    }
                }
                _ => fields.push((name, value)),
            }
        }

        let password_field = password_field?;
        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url.join(action).ok()?,
            _ => page_url.clone(),
        };

        Some(Self {
            action,
            password_field,
            fields,
        })
    }

    /// The form fields with the credentials filled in
    fn fields_with(&self, username: &str, password: &str) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(name, value)| {
                if name == "username" {
                    (name.clone(), username.to_string())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        if !fields.iter().any(|(name, _)| name == "username") {
            fields.push(("username".to_string(), username.to_string()));
        }
        fields.push((self.password_field.clone(), password.to_string()));
        fields
    }
}
