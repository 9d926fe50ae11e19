use crate::error::{PageError, Result};
use crate::models::{ActivityCatalog, Reply, ReplyBody};
use reqwest::{Client, Method};
use tracing::{debug, info};
use url::Url;

/// The three calls the page makes against the activities server.
#[allow(async_fn_in_trait)]
pub trait ActivityApi {
    async fn list_activities(&self) -> Result<ActivityCatalog>;

    async fn signup(&self, activity: &str, email: &str) -> Result<Reply>;

    async fn unregister(&self, activity: &str, email: &str) -> Result<Reply>;
}

pub struct ActivitiesClient {
    base_url: Url,
    client: Client,
}

impl ActivitiesClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            client: Client::new(),
        })
    }

    pub fn activities_url(&self) -> Result<Url> {
        self.url_with_segments(&["activities"])
    }

    /// `/activities/{activity}/signup?email={email}`, with the activity
    /// pushed as a single percent-encoded path segment.
    pub fn signup_url(&self, activity: &str, email: &str) -> Result<Url> {
        let mut url = self.url_with_segments(&["activities", activity, "signup"])?;
        url.query_pairs_mut().append_pair("email", email);
        Ok(url)
    }

    fn url_with_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn mutate(&self, method: Method, url: Url) -> Result<Reply> {
        info!("{} {}", method, url);

        let response = self.client.request(method, url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body = match serde_json::from_str::<ReplyBody>(&text) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("Response body is not a JSON object ({}): {}", status, e);
                None
            }
        };

        info!("Response status: {}", status);
        Ok(Reply {
            status: status.as_u16(),
            body,
        })
    }
}

impl ActivityApi for ActivitiesClient {
    async fn list_activities(&self) -> Result<ActivityCatalog> {
        let url = self.activities_url()?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<ReplyBody>(&text).ok())
                .and_then(|body| body.detail().map(str::to_string));
            return Err(PageError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let text = response.text().await?;
        let catalog: ActivityCatalog = serde_json::from_str(&text)?;
        debug!("Fetched {} activities", catalog.len());
        Ok(catalog)
    }

    async fn signup(&self, activity: &str, email: &str) -> Result<Reply> {
        let url = self.signup_url(activity, email)?;
        self.mutate(Method::POST, url).await
    }

    async fn unregister(&self, activity: &str, email: &str) -> Result<Reply> {
        let url = self.signup_url(activity, email)?;
        self.mutate(Method::DELETE, url).await
    }
}
