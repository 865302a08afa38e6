//! Client for the remote learning service.
//!
//! Talks the service's form-POST protocol: a login that sets session
//! cookies and reveals the learner id, a per-word fetch/submit cycle, and
//! an end-of-session grade report. Only this module knows the wire shapes;
//! everything above it sees the `LearningService` trait.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use lingbot_core::error::ServiceError;
use lingbot_core::traits::{Answer, Fetched, GradeReport, LearningService, Presentation};

const DEFAULT_BASE_URL: &str = "https://instaling.pl";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// App version token submitted with every answer. Scraped from the app
/// page after login; this fallback is the last version verified to work.
const DEFAULT_APP_VERSION: &str = "fwif0zy4ty6nte8";

/// Browser user agents rotated per client so sessions don't all share one
/// fingerprint.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.2; Trident/6.0)",
];

pub struct InstalingClient {
    client: reqwest::Client,
    base_url: String,
    login: String,
    password: String,
    answer_marketing: bool,
    child_id: Option<String>,
    app_version: String,
}

impl InstalingClient {
    pub fn new(
        login: &str,
        password: &str,
        answer_marketing: bool,
        base_url: Option<String>,
    ) -> Self {
        let user_agent =
            USER_AGENTS[rand::Rng::gen_range(&mut rand::thread_rng(), 0..USER_AGENTS.len())];
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .cookie_store(true)
            .user_agent(user_agent)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            login: login.to_string(),
            password: password.to_string(),
            answer_marketing,
            child_id: None,
            app_version: DEFAULT_APP_VERSION.to_string(),
        }
    }

    /// Log in with the configured credentials. On success the session
    /// cookie is held by the client, the learner id is extracted from the
    /// returned page, and the current app version token is scraped.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<(), ServiceError> {
        let page = self
            .post_form(
                "/teacher.php?page=teacherActions",
                &[
                    ("action", "login"),
                    ("from", ""),
                    ("log_email", self.login.as_str()),
                    ("log_password", self.password.as_str()),
                ],
            )
            .await?;

        if !page.contains("<title>insta.ling</title>") {
            return Err(ServiceError::LoginFailed(
                "credentials rejected by the service".to_string(),
            ));
        }

        let child_id = extract_child_id(&page).ok_or_else(|| {
            ServiceError::MalformedResponse("login page carries no child id".to_string())
        })?;
        tracing::debug!(child_id, "logged in");
        self.child_id = Some(child_id);

        self.refresh_app_version().await;
        Ok(())
    }

    /// Ask whether today's session is fresh or already begun.
    #[instrument(skip(self))]
    pub async fn is_new_session(&self) -> Result<bool, ServiceError> {
        let child_id = self.child_id()?.to_string();
        let body = self
            .post_form(
                "/ling2/server/actions/init_session.php",
                &[
                    ("child_id", child_id.as_str()),
                    ("repeat", ""),
                    ("start", ""),
                    ("end", ""),
                ],
            )
            .await?;
        let json = parse_json(&body)?;
        json.get("is_new")
            .and_then(Value::as_bool)
            .ok_or_else(|| ServiceError::MalformedResponse(format!("no is_new flag in: {body}")))
    }

    /// Scrape the current app version token from the service's app page.
    /// Failures fall back to [`DEFAULT_APP_VERSION`] with a warning; an
    /// outdated token degrades grading, it does not break the session.
    async fn refresh_app_version(&mut self) {
        let child_id = match self.child_id() {
            Ok(id) => id.to_string(),
            Err(_) => return,
        };
        let path = format!("/ling2/html_app/app.php?child_id={child_id}");
        match self.get(&path).await {
            Ok(page) => match extract_app_version(&page) {
                Some(version) => {
                    if version != DEFAULT_APP_VERSION {
                        tracing::warn!(version, "service app version changed since this release");
                    }
                    self.app_version = version;
                }
                None => {
                    tracing::warn!("app version not found in app page, using default");
                }
            },
            Err(e) => {
                tracing::warn!("failed to fetch app page, using default version: {e}");
            }
        }
    }

    fn child_id(&self) -> Result<&str, ServiceError> {
        self.child_id.as_deref().ok_or(ServiceError::NotLoggedIn)
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .form(params)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_body(response).await
    }

    async fn get(&self, path: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(map_transport_error)?;
        read_body(response).await
    }
}

#[async_trait]
impl LearningService for InstalingClient {
    /// Fetch the next vocabulary item. Marketing questions are skipped
    /// unless the client was configured to answer them.
    #[instrument(skip(self))]
    async fn fetch_next(&self) -> anyhow::Result<Fetched> {
        let child_id = self.child_id()?.to_string();
        loop {
            let body = self
                .post_form(
                    "/ling2/server/actions/generate_next_word.php",
                    &[
                        ("child_id", child_id.as_str()),
                        ("date", &epoch_millis()),
                    ],
                )
                .await?;
            tracing::debug!(%body, "next word response");
            let json = parse_json(&body)?;

            if json.get("summary").is_some() {
                return Ok(Fetched::SessionComplete);
            }
            if !self.answer_marketing && text_field(&json, "type").as_deref() == Some("marketing") {
                tracing::debug!("skipping marketing question");
                continue;
            }

            let word_id = text_field(&json, "id")
                .ok_or_else(|| ServiceError::MalformedResponse(format!("no word id in: {body}")))?;
            let word = text_field(&json, "word")
                .ok_or_else(|| ServiceError::MalformedResponse(format!("no word in: {body}")))?;
            let translation = text_field(&json, "translations").unwrap_or_default();

            return Ok(Fetched::Word(Presentation {
                word_id,
                word,
                translation,
            }));
        }
    }

    /// Submit an answer and cross-check the grade: a correct answer must
    /// come back accepted, a wrong one must come back marked wrong.
    #[instrument(skip(self, answer), fields(word_id = %answer.word_id))]
    async fn submit_answer(&self, answer: &Answer) -> anyhow::Result<bool> {
        let child_id = self.child_id()?.to_string();
        let body = self
            .post_form(
                "/ling2/server/actions/save_answer.php",
                &[
                    ("child_id", child_id.as_str()),
                    ("word_id", &answer.word_id),
                    ("version", &self.app_version),
                    ("answer", &answer.answer_text),
                ],
            )
            .await?;
        tracing::debug!(%body, "save answer response");
        let json = parse_json(&body)?;

        let grade = text_field(&json, "grade")
            .ok_or_else(|| ServiceError::MalformedResponse(format!("no grade in: {body}")))?;
        let answered_correctly = answer.answer_text == answer.word;
        let accepted = (grade == "1" && answered_correctly)
            || ((grade == "0" || grade == "2") && !answered_correctly);
        Ok(accepted)
    }

    /// Fetch the learner's grade report. Tolerant of partial payloads:
    /// missing fields stay empty rather than failing the report.
    #[instrument(skip(self))]
    async fn fetch_report(&self) -> anyhow::Result<GradeReport> {
        let child_id = self.child_id()?.to_string();
        let body = self
            .post_form(
                "/ling2/server/actions/grade_report.php",
                &[
                    ("child_id", child_id.as_str()),
                    ("date", &epoch_millis()),
                ],
            )
            .await?;
        tracing::debug!(%body, "grade report response");

        let json = match parse_json(&body) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not parse grade report: {e}");
                return Ok(GradeReport::default());
            }
        };

        Ok(GradeReport {
            previous_mark: text_field(&json, "prev_mark"),
            current_mark: text_field(&json, "current_mark").unwrap_or_default(),
            days_of_work: text_field(&json, "work_week_days").unwrap_or_default(),
            teacher_words: text_field(&json, "teacher_words").unwrap_or_default(),
            parent_words: text_field(&json, "parent_words").unwrap_or_default(),
            extra_parent_words: text_field(&json, "parent_words_extra").unwrap_or_default(),
            week_remaining_days: text_field(&json, "week_remaining_days").unwrap_or_default(),
        })
    }
}

/// The learner id appears in the login redirect markup as `child_id=NNNNNN`.
fn extract_child_id(page: &str) -> Option<String> {
    let start = page.find("child_id=")? + "child_id=".len();
    let id: String = page[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    (!id.is_empty()).then_some(id)
}

/// The app page embeds the version token inside an `updateParams(id,
/// answer, '<token>');` call.
fn extract_app_version(page: &str) -> Option<String> {
    let marker = "updateParams(id, answer";
    let after = page.find(marker)? + marker.len();
    // The token follows `, '` and runs up to `');`; truncated or mangled
    // pages yield None.
    let rest = page.get(after + 3..)?;
    let end = rest.find(");")?;
    let token = rest.get(..end.checked_sub(1)?)?;
    (!token.is_empty()).then(|| token.to_string())
}

/// Milliseconds since the epoch, the timestamp format the service expects.
fn epoch_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

fn parse_json(body: &str) -> Result<Value, ServiceError> {
    serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(format!("{e}: {body}")))
}

/// Fields arrive as strings or numbers depending on the endpoint; read
/// both as text.
fn text_field(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout(DEFAULT_TIMEOUT_SECS)
    } else {
        ServiceError::NetworkError(e.to_string())
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ServiceError> {
    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.text().await.unwrap_or_default();
        return Err(ServiceError::ApiError { status, message });
    }
    response.text().await.map_err(map_transport_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_PAGE: &str = concat!(
        "<html><head><title>insta.ling</title></head>",
        "<body><a href=\"app.php?child_id=123456&lang=en\">start</a></body></html>",
    );

    async fn logged_in_client(server: &MockServer) -> InstalingClient {
        Mock::given(method("POST"))
            .and(path("/teacher.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(server)
            .await;

        let mut client =
            InstalingClient::new("user@example.com", "hunter2", false, Some(server.uri()));
        client.login().await.unwrap();
        client
    }

    #[tokio::test]
    async fn login_extracts_child_id() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;
        assert_eq!(client.child_id().unwrap(), "123456");
        // App page was never mounted: version falls back to the default.
        assert_eq!(client.app_version, DEFAULT_APP_VERSION);
    }

    #[tokio::test]
    async fn login_rejects_wrong_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teacher.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>login</title>"))
            .mount(&server)
            .await;

        let mut client = InstalingClient::new("user", "wrong", false, Some(server.uri()));
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, ServiceError::LoginFailed(_)));
    }

    #[tokio::test]
    async fn login_scrapes_app_version() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teacher.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ling2/html_app/app.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "function f() { updateParams(id, answer, 'v9xtoken123abc'); }",
            ))
            .mount(&server)
            .await;

        let mut client = InstalingClient::new("user", "pw", false, Some(server.uri()));
        client.login().await.unwrap();
        assert_eq!(client.app_version, "v9xtoken123abc");
    }

    #[tokio::test]
    async fn calls_before_login_fail() {
        let client = InstalingClient::new("user", "pw", false, Some("http://unused".into()));
        let err = client.fetch_next().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn fetch_next_returns_presentation() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/generate_next_word.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 9942,
                "word": "dog",
                "translations": "pies",
                "type": "new_word",
            })))
            .mount(&server)
            .await;

        match client.fetch_next().await.unwrap() {
            Fetched::Word(p) => {
                assert_eq!(p.word_id, "9942");
                assert_eq!(p.word, "dog");
                assert_eq!(p.translation, "pies");
            }
            Fetched::SessionComplete => panic!("expected a word"),
        }
    }

    #[tokio::test]
    async fn fetch_next_detects_session_complete() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/generate_next_word.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "summary": {"words": 20},
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            client.fetch_next().await.unwrap(),
            Fetched::SessionComplete
        ));
    }

    #[tokio::test]
    async fn fetch_next_skips_marketing_questions() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/generate_next_word.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "word": "ad", "translations": "", "type": "marketing",
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/generate_next_word.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2, "word": "cat", "translations": "kot", "type": "new_word",
            })))
            .mount(&server)
            .await;

        match client.fetch_next().await.unwrap() {
            Fetched::Word(p) => assert_eq!(p.word, "cat"),
            Fetched::SessionComplete => panic!("expected a word"),
        }
    }

    #[tokio::test]
    async fn submit_answer_cross_checks_grade() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/save_answer.php"))
            .and(body_string_contains("word_id=77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "grade": "1",
            })))
            .mount(&server)
            .await;

        let correct = Answer {
            word_id: "77".into(),
            word: "dog".into(),
            answer_text: "dog".into(),
        };
        assert!(client.submit_answer(&correct).await.unwrap());

        // Grade 1 for an intentionally wrong answer means the grading
        // disagreed with what the client intended.
        let wrong = Answer {
            word_id: "77".into(),
            word: "dog".into(),
            answer_text: "".into(),
        };
        assert!(!client.submit_answer(&wrong).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_answer_marked_wrong_is_accepted() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/save_answer.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "grade": 2,
            })))
            .mount(&server)
            .await;

        let wrong = Answer {
            word_id: "5".into(),
            word: "letter".into(),
            answer_text: "leter".into(),
        };
        assert!(client.submit_answer(&wrong).await.unwrap());
    }

    #[tokio::test]
    async fn grade_report_parses_fields() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/grade_report.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "prev_mark": "4",
                "current_mark": "5",
                "work_week_days": 3,
                "teacher_words": "120",
                "parent_words": "0",
                "parent_words_extra": "0",
                "week_remaining_days": 2,
            })))
            .mount(&server)
            .await;

        let report = client.fetch_report().await.unwrap();
        assert_eq!(report.previous_mark.as_deref(), Some("4"));
        assert_eq!(report.current_mark, "5");
        assert_eq!(report.days_of_work, "3");
        assert_eq!(report.week_remaining_days, "2");
    }

    #[tokio::test]
    async fn grade_report_tolerates_garbage() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/ling2/server/actions/grade_report.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let report = client.fetch_report().await.unwrap();
        assert_eq!(report.current_mark, "");
        assert!(report.previous_mark.is_none());
    }

    #[test]
    fn child_id_extraction() {
        assert_eq!(
            extract_child_id("...child_id=987654&lang=en...").as_deref(),
            Some("987654")
        );
        assert_eq!(extract_child_id("no id here"), None);
        assert_eq!(extract_child_id("child_id=&"), None);
    }

    #[test]
    fn app_version_extraction() {
        let page = "x(); updateParams(id, answer, 'abc123'); y();";
        assert_eq!(extract_app_version(page).as_deref(), Some("abc123"));
        assert_eq!(extract_app_version("nothing relevant"), None);
    }

    #[test]
    fn app_version_extraction_tolerates_malformed_pages() {
        // Page cut off right after the marker.
        assert_eq!(extract_app_version("updateParams(id, answer"), None);
        assert_eq!(extract_app_version("updateParams(id, answer, "), None);
        // Multibyte characters where the quoted token is expected.
        assert_eq!(extract_app_version("updateParams(id, answer😀);"), None);
        assert_eq!(extract_app_version("updateParams(id, answer…é);"), None);
        // Empty token.
        assert_eq!(extract_app_version("updateParams(id, answer, '');"), None);
    }
}
