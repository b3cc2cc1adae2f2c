//! Create and edit sessions for articles.
//!
//! Editing is a single step: the session holds a current language and
//! re-reads title/content from the normalized record whenever it changes.
//! Submitting merges only that language into the record (see
//! [`apply_language_edit`]). Every submit follows the same order: validate,
//! build payload, send, then notify. A failed submit leaves the typed values
//! and cover selection in place so the user can retry.

use crate::api::{ArticleUpload, CoverImage, NewsClient, UpdateBody};
use crate::content::{
    apply_language_edit, require_text, ArticleRecord, ArticleUpdate, LocalizedMap,
    NormalizedContent,
};
use crate::error::{AdminError, Result};
use crate::i18n::Language;
use crate::notify::{Notice, Notifier};
use tracing::{error, info};

/// Field values of the edit form for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub lang: Language,
    pub title: String,
    pub content: String,
    normalized: NormalizedContent,
}

impl FormState {
    /// Re-populate title/content from the record for another language.
    ///
    /// Unsaved text typed for the previous language is discarded.
    pub fn switch_language(&mut self, lang: Language) {
        self.lang = lang;
        self.title = self
            .normalized
            .title_for(lang.code())
            .unwrap_or_default()
            .to_string();
        self.content = self
            .normalized
            .content_for(lang.code())
            .unwrap_or_default()
            .to_string();
    }

    pub fn normalized(&self) -> &NormalizedContent {
        &self.normalized
    }
}

/// Normalize a record and pick the language the form opens in.
///
/// The first of these that applies wins: `preferred_lang` if the record has
/// an entry for it, the record's original language if it is supported, the
/// first supported language.
pub fn initialize_form_state(item: &ArticleRecord, preferred_lang: Option<Language>) -> FormState {
    let normalized = item.normalized();
    let lang = preferred_lang
        .filter(|lang| normalized.has_language(lang.code()))
        .or_else(|| item.original_language())
        .unwrap_or_else(Language::fallback);

    let mut state = FormState {
        lang,
        title: String::new(),
        content: String::new(),
        normalized,
    };
    state.switch_language(lang);
    state
}

/// Edit session over an existing record.
#[derive(Debug)]
pub struct EditSession {
    record: ArticleRecord,
    form: FormState,
    cover_image: Option<CoverImage>,
}

impl EditSession {
    pub fn open(record: ArticleRecord, preferred_lang: Option<Language>) -> Self {
        let form = initialize_form_state(&record, preferred_lang);
        Self {
            record,
            form,
            cover_image: None,
        }
    }

    pub fn record(&self) -> &ArticleRecord {
        &self.record
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn current_language(&self) -> Language {
        self.form.lang
    }

    pub fn switch_language(&mut self, lang: Language) {
        self.form.switch_language(lang);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.form.content = content.into();
    }

    /// Select a new cover image, returning the one it replaces.
    pub fn set_cover_image(&mut self, cover: Option<CoverImage>) -> Option<CoverImage> {
        std::mem::replace(&mut self.cover_image, cover)
    }

    pub fn cover_image(&self) -> Option<&CoverImage> {
        self.cover_image.as_ref()
    }

    /// Validate and merge the current language into a request body.
    ///
    /// JSON when only text changed, multipart when a new cover goes along.
    pub fn build_update(&self) -> Result<UpdateBody> {
        let edit = apply_language_edit(
            &self.record,
            self.form.lang,
            &self.form.title,
            &self.form.content,
        )?;

        Ok(match &self.cover_image {
            Some(cover) => UpdateBody::Multipart(ArticleUpload {
                title: edit.title,
                content: edit.content,
                original_lang: edit.original_lang,
                cover_image: Some(cover.clone()),
            }),
            None => UpdateBody::Json(ArticleUpdate::from(edit)),
        })
    }

    /// Save the current language.
    ///
    /// The exclusive borrow keeps a second submit from starting while this
    /// one is pending. On success the session adopts the server's record and
    /// stays on the same language.
    pub async fn submit(
        &mut self,
        client: &NewsClient,
        notifier: &dyn Notifier,
    ) -> Result<&ArticleRecord> {
        let body = match self.build_update() {
            Ok(body) => body,
            Err(e) => {
                notifier.notify(Notice::error(validation_message(&e)));
                return Err(e);
            }
        };

        let lang = self.form.lang;
        match client.update_news(&self.record.id, body).await {
            Ok(record) => {
                info!("Saved {} version of article {}", lang.name(), record.id);
                notifier.notify(Notice::success(format!("{} version saved", lang.name())));
                self.form = initialize_form_state(&record, Some(lang));
                self.record = record;
                self.cover_image = None;
                Ok(&self.record)
            }
            Err(e) => {
                error!("Update error for article {}: {}", self.record.id, e);
                notifier.notify(Notice::error(failure_message(&e, "Failed to update article")));
                Err(e)
            }
        }
    }

    /// Mark `lang` as the authoritative language without touching content.
    ///
    /// Sends only `originalLang`; typed but unsaved text stays in the form.
    pub async fn set_original_language(
        &mut self,
        lang: Language,
        client: &NewsClient,
        notifier: &dyn Notifier,
    ) -> Result<&ArticleRecord> {
        let body = UpdateBody::Json(ArticleUpdate::original_lang_only(lang));
        match client.update_news(&self.record.id, body).await {
            Ok(record) => {
                info!("Article {} original language set to {}", record.id, lang);
                notifier.notify(Notice::success(format!(
                    "Original language set to {}",
                    lang.name()
                )));
                self.record = record;
                Ok(&self.record)
            }
            Err(e) => {
                error!("Original language update error for article {}: {}", self.record.id, e);
                notifier.notify(Notice::error(failure_message(&e, "Failed to update article")));
                Err(e)
            }
        }
    }
}

/// Edit of one derived (non-original) language through the translation
/// endpoint.
#[derive(Debug, Clone)]
pub struct TranslationEdit {
    record_id: String,
    lang: Language,
    pub title: String,
    pub content: String,
}

impl TranslationEdit {
    /// Languages that can be picked: every supported one except the original.
    pub fn selectable_languages(record: &ArticleRecord) -> Vec<Language> {
        Language::all()
            .filter(|lang| lang.code() != record.original_lang)
            .collect()
    }

    /// Start editing `lang`, pre-filled from the record.
    ///
    /// # Errors
    /// `AdminError::Validation` when `lang` is the record's original
    /// language, which is edited through [`EditSession`] instead.
    pub fn open(record: &ArticleRecord, lang: Language) -> Result<Self> {
        if lang.code() == record.original_lang {
            return Err(AdminError::Validation(format!(
                "{} is the original language; edit it as the original",
                lang.name()
            )));
        }

        let normalized = record.normalized();
        Ok(Self {
            record_id: record.id.clone(),
            lang,
            title: normalized.title_for(lang.code()).unwrap_or_default().to_string(),
            content: normalized.content_for(lang.code()).unwrap_or_default().to_string(),
        })
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    pub async fn submit(&self, client: &NewsClient, notifier: &dyn Notifier) -> Result<ArticleRecord> {
        let (title, content) = match validate_pair(&self.title, &self.content) {
            Ok(pair) => pair,
            Err(e) => {
                notifier.notify(Notice::error(validation_message(&e)));
                return Err(e);
            }
        };

        match client
            .update_translation(&self.record_id, self.lang, title, content)
            .await
        {
            Ok(record) => {
                notifier.notify(Notice::success(format!(
                    "{} translation updated!",
                    self.lang.name()
                )));
                Ok(record)
            }
            Err(e) => {
                error!("Translation update error for article {}: {}", self.record_id, e);
                notifier.notify(Notice::error(failure_message(&e, "Failed to update translation")));
                Err(e)
            }
        }
    }
}

/// Form for a new article written in one language.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub original_lang: Language,
    pub title: String,
    pub content: String,
    pub cover_image: Option<CoverImage>,
}

impl CreateForm {
    pub fn new(original_lang: Language) -> Self {
        Self {
            original_lang,
            title: String::new(),
            content: String::new(),
            cover_image: None,
        }
    }

    /// Validate and build the multipart payload.
    ///
    /// # Errors
    /// `AdminError::Validation` for an empty title or content, or a missing
    /// cover image.
    pub fn build_upload(&self) -> Result<ArticleUpload> {
        let (title, content) = validate_pair(&self.title, &self.content)?;
        let cover = self
            .cover_image
            .clone()
            .ok_or_else(|| AdminError::Validation("Cover image is required".to_string()))?;

        let code = self.original_lang.code().to_string();
        let mut titles = LocalizedMap::new();
        titles.insert(code.clone(), title.to_string());
        let mut contents = LocalizedMap::new();
        contents.insert(code.clone(), content.to_string());

        Ok(ArticleUpload {
            title: titles,
            content: contents,
            original_lang: code,
            cover_image: Some(cover),
        })
    }

    /// Publish the article. The form is cleared only after success.
    pub async fn submit(&mut self, client: &NewsClient, notifier: &dyn Notifier) -> Result<ArticleRecord> {
        let upload = match self.build_upload() {
            Ok(upload) => upload,
            Err(e) => {
                notifier.notify(Notice::error(validation_message(&e)));
                return Err(e);
            }
        };

        match client.create_news(upload).await {
            Ok(record) => {
                notifier.notify(Notice::success("Article published"));
                *self = Self::new(self.original_lang);
                Ok(record)
            }
            Err(e) => {
                error!("Create error: {}", e);
                notifier.notify(Notice::error(failure_message(&e, "Failed to create article")));
                Err(e)
            }
        }
    }
}

fn validate_pair<'a>(title: &'a str, content: &'a str) -> Result<(&'a str, &'a str)> {
    Ok((require_text(title, "Title")?, require_text(content, "Content")?))
}

/// Notice text for input rejected before sending.
fn validation_message(error: &AdminError) -> String {
    match error {
        AdminError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Generic message for a failed request; a lost session gets its own hint.
fn failure_message(error: &AdminError, generic: &str) -> String {
    match error {
        AdminError::Unauthenticated => error.to_string(),
        _ => generic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content::tests::{create_record, map};
    use crate::content::LocalizedText;
    use crate::notify::{NoticeLevel, RecordingNotifier};
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn bilingual_record() -> ArticleRecord {
        create_record(
            &[("en", "Hello"), ("de", "Hallo")],
            &[("en", "<p>Hi</p>"), ("de", "<p>Hi DE</p>")],
        )
    }

    fn create_cover() -> CoverImage {
        CoverImage {
            file_name: "cover.jpg".to_string(),
            mime_type: "image/jpeg",
            bytes: b"fake-jpeg".to_vec(),
        }
    }

    fn create_client(server: &MockServer) -> NewsClient {
        NewsClient::new(&Config::for_server(&server.uri()))
            .unwrap()
            .with_token("test-token")
    }

    // ==================== initialize_form_state Tests ====================

    #[test]
    fn test_initial_language_prefers_requested() {
        let state = initialize_form_state(&bilingual_record(), Some(Language::GERMAN));
        assert_eq!(state.lang, Language::GERMAN);
        assert_eq!(state.title, "Hallo");
        assert_eq!(state.content, "<p>Hi DE</p>");
    }

    #[test]
    fn test_initial_language_ignores_missing_preference() {
        let state = initialize_form_state(&bilingual_record(), Some(Language::SPANISH));
        assert_eq!(state.lang, Language::ENGLISH);
        assert_eq!(state.title, "Hello");
    }

    #[test]
    fn test_initial_language_uses_original_lang() {
        let mut record = bilingual_record();
        record.original_lang = "de".to_string();
        let state = initialize_form_state(&record, None);
        assert_eq!(state.lang, Language::GERMAN);
    }

    #[test]
    fn test_initial_language_falls_back_to_first_supported() {
        let mut record = create_record(&[("pt", "Olá")], &[("pt", "<p>Olá</p>")]);
        record.original_lang = "pt".to_string();
        let state = initialize_form_state(&record, None);
        assert_eq!(state.lang, Language::fallback());
        assert_eq!(state.title, "");
        assert_eq!(state.content, "");
    }

    #[test]
    fn test_initialize_legacy_record() {
        let mut record = create_record(&[], &[]);
        record.title = LocalizedText::LegacyScalar("Plain".to_string());
        record.content = LocalizedText::LegacyScalar("<p>Plain</p>".to_string());
        record.original_lang = "it".to_string();

        let state = initialize_form_state(&record, None);
        assert_eq!(state.lang.code(), "it");
        assert_eq!(state.title, "Plain");
        assert_eq!(state.normalized().title, map(&[("it", "Plain")]));
    }

    #[test]
    fn test_switch_language_rereads_record() {
        let mut state = initialize_form_state(&bilingual_record(), None);
        state.title = "typed but unsaved".to_string();

        state.switch_language(Language::GERMAN);
        assert_eq!(state.title, "Hallo");

        state.switch_language(Language::SPANISH);
        assert_eq!(state.title, "");
        assert_eq!(state.content, "");

        state.switch_language(Language::ENGLISH);
        assert_eq!(state.title, "Hello");
    }

    // ==================== EditSession Tests ====================

    #[test]
    fn test_build_update_json_without_cover() {
        let mut session = EditSession::open(bilingual_record(), Some(Language::GERMAN));
        session.set_title("Servus");

        match session.build_update().unwrap() {
            UpdateBody::Json(update) => {
                assert_eq!(update.title, Some(map(&[("en", "Hello"), ("de", "Servus")])));
                assert_eq!(update.original_lang.as_deref(), Some("de"));
            }
            other => panic!("Expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_build_update_multipart_with_cover() {
        let mut session = EditSession::open(bilingual_record(), None);
        assert!(session.set_cover_image(Some(create_cover())).is_none());

        match session.build_update().unwrap() {
            UpdateBody::Multipart(upload) => {
                assert_eq!(upload.cover_image, Some(create_cover()));
                assert_eq!(upload.original_lang, "en");
            }
            other => panic!("Expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_replacing_cover_returns_previous() {
        let mut session = EditSession::open(bilingual_record(), None);
        session.set_cover_image(Some(create_cover()));
        let previous = session.set_cover_image(None);
        assert_eq!(previous, Some(create_cover()));
        assert!(session.cover_image().is_none());
    }

    #[tokio::test]
    async fn test_submit_empty_title_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut session = EditSession::open(bilingual_record(), None);
        session.set_title("   ");

        let err = session.submit(&create_client(&server), &notifier).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(notifier.last().unwrap(), Notice::error("Title is required"));
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
        assert_eq!(session.form().title, "   ");
    }

    #[tokio::test]
    async fn test_submit_merges_current_language() {
        let server = MockServer::start().await;
        let updated = serde_json::json!({
            "_id": "abc123",
            "title": {"en": "Hello", "de": "Servus"},
            "content": {"en": "<p>Hi</p>", "de": "<p>Hi DE</p>"},
            "originalLang": "de"
        });

        Mock::given(method("PUT"))
            .and(path("/news/abc123"))
            .and(body_json(serde_json::json!({
                "title": {"en": "Hello", "de": "Servus"},
                "content": {"en": "<p>Hi</p>", "de": "<p>Hi DE</p>"},
                "originalLang": "de"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut session = EditSession::open(bilingual_record(), Some(Language::GERMAN));
        session.set_title("Servus");

        let record = session
            .submit(&create_client(&server), &notifier)
            .await
            .expect("Should save");
        assert_eq!(record.original_lang, "de");
        assert_eq!(session.current_language(), Language::GERMAN);
        assert_eq!(session.form().title, "Servus");
        assert_eq!(
            notifier.last().unwrap(),
            Notice::success("German version saved")
        );
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_form() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut session = EditSession::open(bilingual_record(), None);
        session.set_title("Changed");
        session.set_cover_image(Some(create_cover()));

        assert!(session.submit(&create_client(&server), &notifier).await.is_err());
        assert_eq!(session.form().title, "Changed");
        assert!(session.cover_image().is_some());
        assert_eq!(session.record().normalized().title_for("en"), Some("Hello"));
        assert_eq!(notifier.last().unwrap(), Notice::error("Failed to update article"));
    }

    #[tokio::test]
    async fn test_set_original_language_sends_metadata_only() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/news/abc123"))
            .and(body_json(serde_json::json!({"originalLang": "de"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "abc123",
                "title": {"en": "Hello", "de": "Hallo"},
                "content": {"en": "<p>Hi</p>", "de": "<p>Hi DE</p>"},
                "originalLang": "de"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut session = EditSession::open(bilingual_record(), None);
        session.set_title("unsaved");

        let record = session
            .set_original_language(Language::GERMAN, &create_client(&server), &notifier)
            .await
            .expect("Should update");
        assert_eq!(record.original_lang, "de");
        assert_eq!(session.form().title, "unsaved");
        assert_eq!(
            notifier.last().unwrap(),
            Notice::success("Original language set to German")
        );
    }

    // ==================== TranslationEdit Tests ====================

    #[test]
    fn test_selectable_languages_exclude_original() {
        let langs = TranslationEdit::selectable_languages(&bilingual_record());
        assert_eq!(langs.len(), 7);
        assert!(!langs.contains(&Language::ENGLISH));
    }

    #[test]
    fn test_translation_edit_rejects_original() {
        let err = TranslationEdit::open(&bilingual_record(), Language::ENGLISH).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_translation_edit_prefills() {
        let edit = TranslationEdit::open(&bilingual_record(), Language::GERMAN).unwrap();
        assert_eq!(edit.title, "Hallo");
        assert_eq!(edit.lang(), Language::GERMAN);

        let edit = TranslationEdit::open(&bilingual_record(), Language::SPANISH).unwrap();
        assert_eq!(edit.title, "");
    }

    #[tokio::test]
    async fn test_translation_submit_trims() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/news/abc123/translation/de"))
            .and(body_json(serde_json::json!({"title": "Servus", "content": "<p>Servus</p>"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "abc123", "originalLang": "en"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut edit = TranslationEdit::open(&bilingual_record(), Language::GERMAN).unwrap();
        edit.title = " Servus ".to_string();
        edit.content = "<p>Servus</p>\n".to_string();

        edit.submit(&create_client(&server), &notifier).await.expect("Should save");
        assert_eq!(notifier.last().unwrap(), Notice::success("German translation updated!"));
    }

    // ==================== CreateForm Tests ====================

    #[test]
    fn test_create_requires_cover() {
        let mut form = CreateForm::new(Language::ENGLISH);
        form.title = "Hello".to_string();
        form.content = "<p>Hi</p>".to_string();

        let err = form.build_upload().unwrap_err();
        assert!(err.to_string().contains("Cover image"));
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let mut form = CreateForm::new(Language::ENGLISH);
        form.cover_image = Some(create_cover());
        form.content = "<p>Hi</p>".to_string();
        assert!(form.build_upload().unwrap_err().is_validation());

        form.title = "Hello".to_string();
        form.content = " \n ".to_string();
        assert!(form.build_upload().unwrap_err().is_validation());
    }

    #[test]
    fn test_create_payload() {
        let mut form = CreateForm::new(Language::ENGLISH);
        form.title = "Hello".to_string();
        form.content = "<p>Hi</p>".to_string();
        form.cover_image = Some(create_cover());

        let upload = form.build_upload().unwrap();
        let fields = upload.text_fields().unwrap();
        assert_eq!(fields[0].1, r#"{"en":"Hello"}"#);
        assert_eq!(fields[1].1, r#"{"en":"<p>Hi</p>"}"#);
        assert_eq!(fields[2].1, "en");
    }

    #[tokio::test]
    async fn test_create_failure_keeps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = RecordingNotifier::default();
        let mut form = CreateForm::new(Language::GERMAN);
        form.title = "Hallo".to_string();
        form.content = "<p>Hallo</p>".to_string();
        form.cover_image = Some(create_cover());

        assert!(form.submit(&create_client(&server), &notifier).await.is_err());
        assert_eq!(form.title, "Hallo");
        assert!(form.cover_image.is_some());
        assert_eq!(notifier.last().unwrap(), Notice::error("Failed to create article"));
    }
}
