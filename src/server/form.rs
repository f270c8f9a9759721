use crate::llm::types::{AdRequest, Attachment};
use crate::server::response::ApiError;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Form;
use log::warn;

pub const FIELD_PRODUCT: &str = "selectedProduct";
pub const FIELD_PLATFORMS: &str = "selectedPlatforms";
pub const FIELD_CHAT_INPUT: &str = "chatInput";
pub const FIELD_ATTACHMENTS: &str = "attachedFiles";

/// Raw form fields as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdRequestForm {
    pub selected_product: Option<String>,
    pub selected_platforms: Vec<String>,
    pub chat_input: Option<String>,
    pub attached_files: Vec<Attachment>,
}

impl AdRequestForm {
    /// Records a text field. Repeated scalars keep their first value.
    pub fn push_field(&mut self, name: &str, value: String) {
        match name {
            FIELD_PRODUCT => {
                self.selected_product.get_or_insert(value);
            }
            FIELD_PLATFORMS => self.selected_platforms.push(value),
            FIELD_CHAT_INPUT => {
                self.chat_input.get_or_insert(value);
            }
            _ => {}
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut form = Self::default();
        for (name, value) in pairs {
            form.push_field(&name, value);
        }
        form
    }

    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    if name == FIELD_ATTACHMENTS {
                        let content = field.bytes().await?.to_vec();
                        form.attached_files.push(Attachment { filename, content });
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.push_field(&name, value);
                }
            }
        }

        Ok(form)
    }

    /// Decodes a multipart or urlencoded body.
    ///
    /// A body over the upload limit is rejected. Any other undecodable body
    /// yields an empty form, which then fails validation.
    pub async fn from_request(request: Request) -> Result<Self, ApiError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = match Multipart::from_request(request, &()).await {
                Ok(multipart) => multipart,
                Err(rejection) => {
                    warn!("Rejected multipart body: {}", rejection);
                    return unreadable_body(rejection.status());
                }
            };
            match Self::from_multipart(multipart).await {
                Ok(form) => Ok(form),
                Err(e) => {
                    warn!("Could not read multipart form: {}", e);
                    unreadable_body(e.status())
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<Vec<(String, String)>>::from_request(request, &()).await {
                Ok(Form(pairs)) => Ok(Self::from_pairs(pairs)),
                Err(rejection) => {
                    warn!("Rejected urlencoded body: {}", rejection);
                    unreadable_body(rejection.status())
                }
            }
        } else {
            if !content_type.is_empty() {
                warn!("Unsupported form content type '{}'", content_type);
            }
            Ok(Self::default())
        }
    }

    pub fn attachment_names(&self) -> Vec<&str> {
        self.attached_files
            .iter()
            .map(|file| file.filename.as_str())
            .collect()
    }

    pub fn into_ad_request(self) -> Result<AdRequest, ApiError> {
        let product = self.selected_product.filter(|value| !value.is_empty());
        let chat_input = self.chat_input.filter(|value| !value.is_empty());

        match (product, chat_input) {
            (Some(product), Some(chat_input)) if !self.selected_platforms.is_empty() => {
                Ok(AdRequest {
                    product,
                    platforms: self.selected_platforms,
                    chat_input,
                    attachments: self.attached_files,
                })
            }
            _ => Err(ApiError::MissingParameters),
        }
    }
}

fn unreadable_body(status: StatusCode) -> Result<AdRequestForm, ApiError> {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Err(ApiError::PayloadTooLarge)
    } else {
        Ok(AdRequestForm::default())
    }
}
