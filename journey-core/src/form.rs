//! Submission form contents and validation.
//!
//! A [`StoryForm`] holds whatever the submitter has typed so far. Validation
//! turns it into a [`Draft`]; the id and date are left to the store.

use crate::story::{Draft, Identity, DEFAULT_AUTHOR};
use base64::Engine;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Pause between pressing submit and the draft being handed on.
pub const SUBMIT_DELAY: Duration = Duration::from_millis(800);

/// Required text fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    GraduationYear,
    College,
    TargetPerson,
    Content,
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::GraduationYear => "graduationYear",
            FormField::College => "college",
            FormField::TargetPerson => "targetPerson",
            FormField::Content => "content",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::GraduationYear => "毕业年份 / 入学年份",
            FormField::College => "学院/单位",
            FormField::TargetPerson => "故事的主角",
            FormField::Content => "故事内容",
        }
    }
}

/// Errors from form validation and image attachment.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("请选择身份 (identity is required)")]
    MissingIdentity,

    #[error("请填写{} ({} is required)", .0.label(), .0.name())]
    MissingField(FormField),

    #[error("could not read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not an image ({mime})", .path.display())]
    NotAnImage { path: PathBuf, mime: String },
}

/// The editable contents of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoryForm {
    pub identity: Option<Identity>,
    pub graduation_year: String,
    pub college: String,
    pub target_person: String,
    pub content: String,
    /// Data URL of the attached photo.
    pub image: Option<String>,
    pub author: String,
}

impl StoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the form and build a draft from it.
    ///
    /// Identity must be chosen and the fields the form marks as required
    /// must not be blank. A blank author becomes [`DEFAULT_AUTHOR`].
    pub fn validate(&self) -> Result<Draft, FormError> {
        let identity = self.identity.ok_or(FormError::MissingIdentity)?;

        let required = [
            (FormField::GraduationYear, &self.graduation_year),
            (FormField::College, &self.college),
            (FormField::TargetPerson, &self.target_person),
            (FormField::Content, &self.content),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(FormError::MissingField(*field));
        }

        let author = if self.author.trim().is_empty() {
            DEFAULT_AUTHOR.to_string()
        } else {
            self.author.clone()
        };

        Ok(Draft {
            identity,
            college: self.college.clone(),
            graduation_year: self.graduation_year.clone(),
            target_person: self.target_person.clone(),
            content: self.content.clone(),
            image: self.image.clone(),
            author,
        })
    }

    /// Read the file at `path` and attach it as the story photo.
    pub fn attach_image(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
        self.image = Some(load_image(path)?);
        Ok(())
    }

    pub fn remove_image(&mut self) {
        self.image = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Encode raw bytes as a `data:` URL.
pub fn encode_image(bytes: &[u8], mime: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Read an image file and encode it as a `data:` URL.
///
/// Only the file type is checked (by extension); size and format are
/// accepted as-is.
pub fn load_image(path: impl AsRef<Path>) -> Result<String, FormError> {
    let path = path.as_ref();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(FormError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| FormError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_image(&bytes, mime.essence_str()))
}

/// Approximate decoded size of a `data:` URL payload, for display.
pub fn image_size_hint(data_url: &str) -> usize {
    let payload = data_url.split_once(',').map(|(_, p)| p).unwrap_or(data_url);
    payload.len() / 4 * 3
}
